//! Reading the caller's deadline from gRPC request metadata.
//!
//! gRPC clients send their remaining budget in the `grpc-timeout` header as
//! up to eight ASCII digits followed by a unit: `H` (hours), `M` (minutes),
//! `S` (seconds), `m` (milliseconds), `u` (microseconds) or `n`
//! (nanoseconds). A missing or malformed header means "no deadline".

use std::time::Duration;
use tonic::metadata::MetadataMap;

pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

const MAX_DIGITS: usize = 8;

/// Returns the caller's time budget, if it sent a valid one.
pub fn grpc_timeout(metadata: &MetadataMap) -> Option<Duration> {
    let value = metadata.get(GRPC_TIMEOUT_HEADER)?.to_str().ok()?;
    parse_grpc_timeout(value)
}

pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if !value.is_ascii() || value.len() < 2 || value.len() > MAX_DIGITS + 1 {
        return None;
    }

    let (digits, unit) = value.split_at(value.len() - 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    let timeout = match unit {
        "H" => Duration::from_secs(amount * 60 * 60),
        "M" => Duration::from_secs(amount * 60),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(timeout)
}
