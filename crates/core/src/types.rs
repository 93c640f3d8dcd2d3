/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// All money amounts are integer minor units of their currency
/// (cents for USD/EUR). Signed: payout transactions carry negative amounts.
pub type MinorUnits = i64;
