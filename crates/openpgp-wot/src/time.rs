//! Time utilities.
//!
//! All timestamps are Unix epoch microseconds (u64).

use serde::{Deserialize, Serialize};

/// Return the current time as microseconds since Unix epoch.
pub fn now_micros() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Convert microseconds to an RFC 3339 string.
pub fn micros_to_rfc3339(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    let nsecs = ((micros % 1_000_000) * 1000) as u32;
    let dt = chrono::DateTime::from_timestamp(secs, nsecs).unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}

/// Parse an RFC 3339 string into microseconds since Unix epoch.
///
/// Instants before the epoch are rejected.
pub fn rfc3339_to_micros(s: &str) -> Option<u64> {
    let dt = chrono::DateTime::parse_from_rfc3339(s).ok()?;
    u64::try_from(dt.timestamp_micros()).ok()
}

/// The instant against which every expiry, revocation, and signature
/// validity check of one network build is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReferenceTime(u64);

impl ReferenceTime {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self(now_micros())
    }

    /// A fixed instant, in microseconds since Unix epoch.
    pub fn at(micros: u64) -> Self {
        Self(micros)
    }

    /// The instant in microseconds since Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.0
    }
}

impl Default for ReferenceTime {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for ReferenceTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&micros_to_rfc3339(self.0))
    }
}
