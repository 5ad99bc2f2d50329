//! Subscription tiers and the quota policy attached to them.
//!
//! The search thresholds live only here. Every other component asks the tier
//! for its limit instead of repeating the numbers, so the policy cannot drift
//! between the ledger, the admin surface, and the persistence layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Monthly search allowance for the free tier.
pub const FREE_SEARCH_LIMIT: u32 = 3;
/// Monthly search allowance for the premium tier.
pub const PREMIUM_SEARCH_LIMIT: u32 = 20;

/// Subscription level determining a user's search quota.
///
/// # Examples
///
/// ```
/// # use backend::domain::Tier;
/// assert_eq!(Tier::default(), Tier::Free);
/// assert_eq!("premium".parse::<Tier>(), Ok(Tier::Premium));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Entry tier with a small allowance.
    #[default]
    Free,
    /// Paid tier with an expanded allowance.
    Premium,
    /// Paid tier with no allowance cap.
    Unlimited,
}

impl Tier {
    /// Returns the database and wire string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backend::domain::Tier;
    /// assert_eq!(Tier::Unlimited.as_str(), "unlimited");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Unlimited => "unlimited",
        }
    }

    /// The search allowance attached to this tier.
    pub const fn search_limit(&self) -> SearchLimit {
        match self {
            Self::Free => SearchLimit::Limited(FREE_SEARCH_LIMIT),
            Self::Premium => SearchLimit::Limited(PREMIUM_SEARCH_LIMIT),
            Self::Unlimited => SearchLimit::Unlimited,
        }
    }

    /// Whether `count` recorded searches exhaust this tier's allowance.
    ///
    /// Monotonic in `count`: once true it stays true for every greater count.
    /// Always false for [`Tier::Unlimited`].
    pub const fn is_limit_reached(&self, count: u32) -> bool {
        match self.search_limit() {
            SearchLimit::Limited(limit) => count >= limit,
            SearchLimit::Unlimited => false,
        }
    }

    /// Searches still available at `count` recorded searches.
    ///
    /// Saturates at zero for finite tiers; unlimited tiers always report
    /// [`SearchLimit::Unlimited`] regardless of the count.
    pub const fn remaining(&self, count: u32) -> SearchLimit {
        match self.search_limit() {
            SearchLimit::Limited(limit) => SearchLimit::Limited(limit.saturating_sub(count)),
            SearchLimit::Unlimited => SearchLimit::Unlimited,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown tier string.
///
/// Callers must surface this instead of silently defaulting: an unrecognised
/// tier identifier is an input error, not a free account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTierError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseTierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown tier: {}", self.input)
    }
}

impl std::error::Error for ParseTierError {}

impl std::str::FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "premium" => Ok(Self::Premium),
            "unlimited" => Ok(Self::Unlimited),
            _ => Err(ParseTierError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A search allowance: a finite count or no cap at all.
///
/// Serialises as a JSON number for finite allowances and `null` for
/// unlimited ones, matching the portal's wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchLimit {
    /// A finite allowance.
    Limited(u32),
    /// No cap.
    Unlimited,
}

impl SearchLimit {
    /// Finite value, or `None` when unlimited.
    pub const fn finite(&self) -> Option<u32> {
        match self {
            Self::Limited(value) => Some(*value),
            Self::Unlimited => None,
        }
    }
}

impl Serialize for SearchLimit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Limited(value) => serializer.serialize_u32(*value),
            Self::Unlimited => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::free("free", Tier::Free)]
    #[case::premium("premium", Tier::Premium)]
    #[case::unlimited("unlimited", Tier::Unlimited)]
    fn tier_parses_valid_strings(#[case] input: &str, #[case] expected: Tier) {
        let parsed: Tier = input.parse().expect("valid tier");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_str(), input);
    }

    #[rstest]
    #[case::unknown("gold")]
    #[case::empty("")]
    #[case::capitalised("Free")]
    fn tier_rejects_invalid_strings(#[case] input: &str) {
        let err = input.parse::<Tier>().expect_err("unknown tier must fail");
        assert_eq!(err.input, input);
    }

    #[rstest]
    #[case(Tier::Free, FREE_SEARCH_LIMIT)]
    #[case(Tier::Premium, PREMIUM_SEARCH_LIMIT)]
    fn finite_tiers_expose_their_threshold(#[case] tier: Tier, #[case] limit: u32) {
        assert_eq!(tier.search_limit().finite(), Some(limit));
    }

    #[rstest]
    fn unlimited_tier_has_no_threshold() {
        assert_eq!(Tier::Unlimited.search_limit().finite(), None);
    }

    #[rstest]
    #[case(Tier::Free)]
    #[case(Tier::Premium)]
    fn limit_reached_is_monotonic_in_count(#[case] tier: Tier) {
        let mut reached = false;
        for count in 0..=64 {
            let now = tier.is_limit_reached(count);
            assert!(
                !reached || now,
                "limit flag must never flip back to false once set (count {count})"
            );
            reached = now;
        }
        assert!(reached, "finite tiers must eventually reach their limit");
    }

    #[rstest]
    fn unlimited_never_reaches_a_limit() {
        for count in [0, 1, 1_000, u32::MAX] {
            assert!(!Tier::Unlimited.is_limit_reached(count));
            assert_eq!(Tier::Unlimited.remaining(count), SearchLimit::Unlimited);
        }
    }

    #[rstest]
    #[case(Tier::Free)]
    #[case(Tier::Premium)]
    fn remaining_plus_count_never_exceeds_limit(#[case] tier: Tier) {
        let limit = tier.search_limit().finite().expect("finite tier");
        for count in 0..=limit + 5 {
            let remaining = tier.remaining(count).finite().expect("finite remaining");
            assert!(remaining + count.min(limit) <= limit);
        }
    }

    #[rstest]
    fn remaining_saturates_at_zero() {
        assert_eq!(
            Tier::Free.remaining(FREE_SEARCH_LIMIT + 10),
            SearchLimit::Limited(0)
        );
    }

    #[rstest]
    fn search_limit_serialises_number_or_null() {
        let finite = serde_json::to_value(SearchLimit::Limited(7)).expect("serialise");
        assert_eq!(finite, serde_json::json!(7));
        let unlimited = serde_json::to_value(SearchLimit::Unlimited).expect("serialise");
        assert!(unlimited.is_null());
    }
}
