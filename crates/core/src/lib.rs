//! Pure domain logic for the HRKey data-access marketplace.
//!
//! Everything in this crate is synchronous and I/O-free: shared type
//! aliases, the domain error taxonomy, the access-request state machine,
//! the revenue split calculator, the beneficiary union, and payout
//! validation. Persistence and HTTP concerns live in `hrkey-db` and
//! `hrkey-api`.

pub mod beneficiary;
pub mod error;
pub mod payout;
pub mod request;
pub mod split;
pub mod types;
