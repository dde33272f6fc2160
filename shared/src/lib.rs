//! Shared domain logic for the event management services: role resolution,
//! role-scoped event visibility, attendance ledgers and the clients for the
//! external events backend.

pub mod access;
pub mod api;
pub mod auth;
pub mod export;
pub mod gateway;
pub mod ledger;
pub mod models;
pub mod registration;
pub mod session;
pub mod visibility;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
