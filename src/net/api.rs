//! REST endpoint paths, relative to the configured base URL.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_VERIFY: &str = "/auth/verify";
pub const AUTH_LOGOUT: &str = "/auth/logout";

pub const SHELTERS: &str = "/shelters";
pub const SUBSCRIPTIONS: &str = "/subscriptions";
pub const SUBSCRIBE: &str = "/subscriptions/subscribe";
pub const USERS_ME: &str = "/users/me";

#[must_use]
pub fn shelter_endpoint(id: i64) -> String {
    format!("{SHELTERS}/{id}")
}

#[must_use]
pub fn subscription_endpoint(id: i64) -> String {
    format!("{SUBSCRIPTIONS}/{id}")
}

#[must_use]
pub fn user_endpoint(id: i64) -> String {
    format!("/users/{id}")
}

/// Whether `path` targets the session-verification endpoint. A 401 from it
/// must not trigger navigation, or a bad token would loop verify forever.
#[must_use]
pub fn is_verify_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.trim_end_matches('/') == AUTH_VERIFY
}
