//! Wire-level error codes (§7).
//!
//! These never become Rust errors that propagate up the call stack; a
//! handler that hits one of these conditions returns the corresponding
//! fixed string as its reply payload. Process-level failures (artifact
//! loading, bind failure) are a separate `thiserror` enum owned by the
//! `rdbg` binary crate, per §7.

/// Malformed packet: missing field, unparseable hex, out-of-range index.
pub const E01: &str = "E01";

/// Length/content mismatch, e.g. a declared byte count that does not match
/// the decoded hex payload.
pub const E02: &str = "E02";

/// Unrecognized command. Per §7 this is forward-compat behavior required by
/// the client ecosystem, not a malformed-packet error.
pub const EMPTY: &str = "";
