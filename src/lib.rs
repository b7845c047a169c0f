//! GHL BayarCash - Tenant credential lifecycle and payment dispatch.
//!
//! Connects HighLevel locations to the BayarCash payment gateway: OAuth
//! install and token refresh, environment-scoped payment intents, custom
//! payment provider registration and uninstall handling.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
