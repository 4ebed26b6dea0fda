// crates/verdict-core/src/core/time.rs
// ============================================================================
// Module: Verdict Time Helpers
// Description: Timestamp and duration helpers for report stamping.
// Purpose: Keep every emitted timestamp in one canonical RFC 3339 form.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Reports carry second-precision RFC 3339 timestamps in UTC. Durations are
//! whole milliseconds measured from monotonic instants so wall-clock
//! adjustments never produce negative values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current UTC time as a second-precision RFC 3339 string.
#[must_use]
pub fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap_or_else(|_| {
        // Zeroing the nanosecond field cannot move the value out of range.
        OffsetDateTime::now_utc()
    });
    now.format(&Rfc3339).unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Returns whole milliseconds elapsed since a monotonic instant.
#[must_use]
pub fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
