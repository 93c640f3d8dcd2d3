pub mod access_request;
pub mod data_access;
pub mod earnings;
