//! HTTP layer for the HRKey data-access marketplace.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
