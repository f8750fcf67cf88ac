//! Deterministic, pure logic shared by the client views.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! drafts and return deterministic outputs suitable for tests.

pub mod cascade;
pub mod errors;
pub mod forms;
pub mod routes;
pub mod session;
pub mod types;
pub mod wizard;
