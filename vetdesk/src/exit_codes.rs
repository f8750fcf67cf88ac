//! Stable exit codes for vetdesk CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed: backend error, unreadable config, or storage failure.
pub const FAILED: i32 = 1;
/// Command targets a protected view and no session is active.
pub const LOGIN_REQUIRED: i32 = 2;
/// Input was rejected locally (validation or wizard state) before submission.
pub const REJECTED: i32 = 3;
