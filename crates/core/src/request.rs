//! Access-request state machine: status and data-type enums, legal
//! transitions, and the lazy-expiry predicate.
//!
//! The enums map to TEXT columns; `as_str`/`parse` are the single source
//! of truth for their wire and storage spelling.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default request lifetime: a pending request a candidate never acts on
/// expires after this many days.
pub const DEFAULT_REQUEST_TTL_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a [`data_access_requests`] row.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl RequestStatus {
    /// Storage spelling (TEXT column value).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(CoreError::Internal(format!(
                "unknown request status in storage: {other}"
            ))),
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }

    /// Whether `self -> to` is a legal state transition.
    ///
    /// The only legal transitions are PENDING -> {APPROVED, REJECTED,
    /// EXPIRED}. Terminal states never transition again.
    pub fn can_transition_to(self, to: RequestStatus) -> bool {
        self == Self::Pending && to != Self::Pending
    }
}

// ---------------------------------------------------------------------------
// Data type
// ---------------------------------------------------------------------------

/// What a company is buying access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// A single reference row (requires a `reference_id` on the request).
    Reference,
    /// The subject's profile fields plus their full reference set.
    Profile,
    /// Profile plus references; priced separately from `Profile`.
    FullData,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Profile => "profile",
            Self::FullData => "full_data",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "reference" => Ok(Self::Reference),
            "profile" => Ok(Self::Profile),
            "full_data" => Ok(Self::FullData),
            other => Err(CoreError::Validation(format!(
                "unknown data type: {other}"
            ))),
        }
    }

    /// Whether requests of this type must name a specific reference.
    pub fn requires_reference(self) -> bool {
        self == Self::Reference
    }
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

/// Whether a PENDING request past its deadline should be lazily expired.
///
/// Expiry is passive: nothing sweeps the table in the background on its
/// own schedule; every read that evaluates PENDING rows applies this
/// predicate first (in SQL) and flips stale rows to EXPIRED.
pub fn is_expired(status: RequestStatus, expires_at: Timestamp, now: Timestamp) -> bool {
    status == RequestStatus::Pending && expires_at < now
}

// ---------------------------------------------------------------------------
// Fee percentages
// ---------------------------------------------------------------------------

/// The three-way fee percentages snapshotted into a request's metadata at
/// creation time, so later pricing changes never affect in-flight requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeePercents {
    pub platform_fee_percent: i32,
    pub user_fee_percent: i32,
    pub ref_creator_fee_percent: i32,
}

impl FeePercents {
    /// Validate that the percentages are non-negative and sum to exactly 100.
    pub fn validate(self) -> Result<(), CoreError> {
        if self.platform_fee_percent < 0
            || self.user_fee_percent < 0
            || self.ref_creator_fee_percent < 0
        {
            return Err(CoreError::Validation(
                "fee percentages must be non-negative".into(),
            ));
        }
        let sum = self.platform_fee_percent + self.user_fee_percent + self.ref_creator_fee_percent;
        if sum != 100 {
            return Err(CoreError::Validation(format!(
                "fee percentages must sum to 100, got {sum}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
