use super::*;

#[test]
fn resource_endpoints_format_expected_paths() {
    assert_eq!(shelter_endpoint(2), "/shelters/2");
    assert_eq!(subscription_endpoint(15), "/subscriptions/15");
    assert_eq!(user_endpoint(9), "/users/9");
}

#[test]
fn verify_path_matches_with_query_or_trailing_slash() {
    assert!(is_verify_path("/auth/verify"));
    assert!(is_verify_path("/auth/verify/"));
    assert!(is_verify_path("/auth/verify?refresh=1"));
}

#[test]
fn other_paths_are_not_verify() {
    assert!(!is_verify_path(AUTH_LOGIN));
    assert!(!is_verify_path("/auth/verify-email"));
    assert!(!is_verify_path(USERS_ME));
}
