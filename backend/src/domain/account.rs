//! Account aggregate: identity, subscription tier, and usage counters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Tier;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdValidationError {
    /// Identifier was empty.
    EmptyId,
    /// Identifier was not a valid UUID.
    InvalidId,
}

impl fmt::Display for UserIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
        }
    }
}

impl std::error::Error for UserIdValidationError {}

/// Stable account identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserIdValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserIdValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserIdValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| UserIdValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Capability role attached to an account.
///
/// Authorisation is a data question, not a configuration one: admin membership
/// lives on the account row so granting or revoking it never needs a redeploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular account with self-service access only.
    #[default]
    Member,
    /// Account permitted to inspect and mutate other accounts.
    Admin,
}

impl Role {
    /// Returns the database string representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }

    /// Whether this role carries the admin capability.
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    /// The unrecognised input value.
    pub input: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.input)
    }
}

impl std::error::Error for ParseRoleError {}

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A portal account.
///
/// ## Invariants
/// - `search_count` is non-negative and only moves up through admitted
///   searches; resets are explicit admin or owner actions.
/// - `tier` is mutated only by admin override or a self-service tier change,
///   never by the usage ledger.
/// - `last_search_date` is informational and takes no part in limit checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Account {
    /// Stable account identifier.
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    /// Display name shown in the admin table.
    pub name: String,
    /// Contact address supplied by the identity provider.
    pub email: String,
    /// Subscription tier determining the search quota.
    pub tier: Tier,
    /// Capability role.
    pub role: Role,
    /// Searches recorded in the current accounting period.
    pub search_count: u32,
    /// Timestamp of the most recent recorded search.
    pub last_search_date: Option<DateTime<Utc>>,
}

impl Account {
    /// Create a builder for constructing accounts incrementally.
    pub fn builder(id: UserId) -> AccountBuilder {
        AccountBuilder::new(id)
    }

    /// Whether this account carries the admin capability.
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this account's quota is exhausted at its current count.
    pub const fn is_limit_reached(&self) -> bool {
        self.tier.is_limit_reached(self.search_count)
    }
}

/// Builder for constructing [`Account`] values incrementally.
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    id: UserId,
    name: String,
    email: String,
    tier: Tier,
    role: Role,
    search_count: u32,
    last_search_date: Option<DateTime<Utc>>,
}

impl AccountBuilder {
    /// Create a new builder for the given account id.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            tier: Tier::default(),
            role: Role::default(),
            search_count: 0,
            last_search_date: None,
        }
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the contact address.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Set the subscription tier.
    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Set the capability role.
    pub fn role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the recorded search count.
    pub fn search_count(mut self, count: u32) -> Self {
        self.search_count = count;
        self
    }

    /// Set the last search timestamp.
    pub fn last_search_date(mut self, at: DateTime<Utc>) -> Self {
        self.last_search_date = Some(at);
        self
    }

    /// Build the final [`Account`].
    pub fn build(self) -> Account {
        Account {
            id: self.id,
            name: self.name,
            email: self.email,
            tier: self.tier,
            role: self.role,
            search_count: self.search_count,
            last_search_date: self.last_search_date,
        }
    }
}
