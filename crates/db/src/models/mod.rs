//! Row models and Create/Update DTOs, one module per table group.

pub mod access_request;
pub mod ledger;
pub mod pricing;
pub mod reference;
pub mod revenue;
pub mod user;
