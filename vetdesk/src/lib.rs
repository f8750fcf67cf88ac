//! Client for the veterinary clinic REST backend.
//!
//! The crate mirrors the clinic's front-desk screens as plain Rust values.
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (wizard state machine, cascading
//!   species/breed selection, form validation, error mapping, route gating).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (HTTP backend, session storage,
//!   configuration files). Isolated behind traits so tests can script them.
//!
//! View modules ([`auth`], [`session`], [`wizard_flow`], [`search`]) coordinate
//! core logic with I/O to implement CLI commands.

pub mod auth;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod search;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod wizard_flow;
