//! I/O helpers for vetdesk commands.

pub mod backend;
pub mod config;
pub mod http;
pub mod session_storage;
