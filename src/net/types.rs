//! Wire DTOs for the Fanimal REST API.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON. Values the backend is
//! loose about (numeric ids sent as strings, verify returning either an
//! envelope or a bare user, tiers as names or price objects) are accepted in
//! every shape here so the stores never have to special-case them.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

// =============================================================================
// IDENTITY
// =============================================================================

/// Opaque role tag attached to a user. No client-side behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
}

/// Account snapshot. Replaced wholesale on login, verify, and profile fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "deserialize_opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Body of a successful `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Body of a successful `GET /auth/verify`.
///
/// Either `{ "token"?, "user" }` or the user object on its own.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VerifyResponse {
    Envelope {
        #[serde(default)]
        token: Option<String>,
        user: User,
    },
    Bare(User),
}

impl VerifyResponse {
    /// Refreshed token, if the backend issued one.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Envelope { token, .. } => token.as_deref().filter(|t| !t.is_empty()),
            Self::Bare(_) => None,
        }
    }

    #[must_use]
    pub fn into_user(self) -> User {
        match self {
            Self::Envelope { user, .. } | Self::Bare(user) => user,
        }
    }
}

// =============================================================================
// SHELTERS
// =============================================================================

/// A shelter as returned by `/shelters`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
}

// =============================================================================
// SUBSCRIPTIONS
// =============================================================================

/// Monthly donation tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Basic,
    Standard,
    Premium,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Basic, Tier::Standard, Tier::Premium];

    /// Monthly price in the backend's currency.
    #[must_use]
    pub fn price(self) -> f64 {
        match self {
            Self::Basic => 9.99,
            Self::Standard => 14.99,
            Self::Premium => 19.99,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Standard => "STANDARD",
            Self::Premium => "PREMIUM",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier '{0}' (expected basic, standard, or premium)")]
pub struct UnknownTier(pub String);

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}

/// Tier as it appears on a subscription: a tier name or a bare `{ price }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TierInfo {
    Named(Tier),
    Priced { price: f64 },
}

impl TierInfo {
    #[must_use]
    pub fn price(&self) -> f64 {
        match self {
            Self::Named(tier) => tier.price(),
            Self::Priced { price } => *price,
        }
    }

    #[must_use]
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Named(tier) => Some(*tier),
            Self::Priced { .. } => None,
        }
    }
}

/// Billing state mirrored from the payment provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Incomplete,
    IncompleteExpired,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
}

/// A recurring donation from a user to a shelter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub user: User,
    pub shelter: Shelter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
    pub tier: TierInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
}

impl Subscription {
    /// Amount charged per period, falling back to the tier price.
    #[must_use]
    pub fn monthly_amount(&self) -> f64 {
        self.amount.unwrap_or_else(|| self.tier.price())
    }
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    fn into_i64<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            Self::Int(v) => Ok(v),
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("invalid id: {s:?}"))),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer)?.into_i64()
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        Some(raw) => raw.into_i64().map(Some),
        None => Ok(None),
    }
}

/// Decode `body` as `T`, treating an empty body as JSON `null`.
pub(crate) fn decode_json<T>(body: &[u8]) -> Result<T, serde_json::Error>
where
    T: for<'de> Deserialize<'de>,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_str("null");
    }
    serde_json::from_slice(body)
}
