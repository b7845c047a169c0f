//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `integration` - Tenant authorization, gateway credentials and uninstall events

pub mod foundation;
pub mod integration;
