//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod access_request_repo;
pub mod ledger_repo;
pub mod payout_repo;
pub mod pricing_repo;
pub mod reference_repo;
pub mod revenue_repo;
pub mod user_repo;

pub use access_request_repo::AccessRequestRepo;
pub use ledger_repo::LedgerRepo;
pub use payout_repo::PayoutRepo;
pub use pricing_repo::PricingRepo;
pub use reference_repo::ReferenceRepo;
pub use revenue_repo::RevenueRepo;
pub use user_repo::UserRepo;
