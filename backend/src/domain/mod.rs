//! Domain primitives, aggregates, and services for the search portal.
//!
//! Purpose: define strongly typed domain entities shared by the HTTP and
//! persistence layers, the tier policy that is the single source of truth for
//! search quotas, and the services implementing the driving ports. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.

pub mod account;
pub mod admin;
pub mod error;
pub mod ports;
pub mod search_event;
pub mod search_service;
pub mod tier;
pub mod usage;

pub use self::account::{Account, AccountBuilder, Role, UserId, UserIdValidationError};
pub use self::admin::AdminService;
pub use self::error::{Error, ErrorCode};
pub use self::search_event::{
    NewSearchEvent, SearchEvent, SearchQuery, SearchQueryValidationError, SearchResult,
};
pub use self::search_service::SearchService;
pub use self::tier::{ParseTierError, SearchLimit, Tier};
pub use self::usage::{UsageInfo, UsageLedger};

/// Convenient result alias for operations returning the domain [`Error`].
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error};
///
/// fn guard(admitted: bool) -> ApiResult<()> {
///     if admitted { Ok(()) } else { Err(Error::forbidden("nope")) }
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
