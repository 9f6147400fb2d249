//! Pre-built records for JSONL tests.

use serde::{Deserialize, Serialize};

/// Sample log entry, the typical shape appended to a JSONL event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleLogEntry {
    pub timestamp: u64,
    pub ip: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub bytes: u64,
}

fn entry(timestamp: u64, ip: &str, method: &str, path: &str, status: u16, bytes: u64) -> SampleLogEntry {
    SampleLogEntry {
        timestamp,
        ip: ip.to_string(),
        method: method.to_string(),
        path: path.to_string(),
        status,
        bytes,
    }
}

/// Five log entries in timestamp order.
///
/// ```
/// use jsonl_stream::testing::sample_log_entries;
///
/// let logs = sample_log_entries();
/// assert_eq!(logs.len(), 5);
/// ```
#[must_use]
pub fn sample_log_entries() -> Vec<SampleLogEntry> {
    vec![
        entry(1_000_000, "192.168.1.100", "GET", "/api/users", 200, 1024),
        entry(1_000_100, "192.168.1.101", "POST", "/api/users", 201, 512),
        entry(1_000_200, "192.168.1.102", "GET", "/api/posts", 200, 2048),
        entry(1_000_300, "192.168.1.100", "GET", "/api/users", 404, 256),
        entry(1_000_400, "192.168.1.103", "DELETE", "/api/posts", 500, 128),
    ]
}

/// JSONL text mixing valid log entries with lines that won't decode as
/// [`SampleLogEntry`]: malformed JSON, a different shape, and blank lines.
///
/// Decoding it yields the first, third and fifth entries of
/// [`sample_log_entries`].
#[must_use]
pub fn mixed_log_jsonl() -> Vec<u8> {
    let logs = sample_log_entries();
    let mut out = Vec::new();
    for (i, log) in logs.iter().enumerate() {
        match i {
            1 => out.extend_from_slice(b"{\"timestamp\": 1000100, \"ip\": "),
            3 => out.extend_from_slice(b"{\"kind\":\"heartbeat\"}"),
            _ => out.extend_from_slice(&serde_json::to_vec(log).unwrap_or_default()),
        }
        out.extend_from_slice(b"\n\n");
    }
    out
}
