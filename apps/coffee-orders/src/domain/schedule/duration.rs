//! Duration rendering in the compact `1h2m3.5s` style.

use std::fmt::Write;

use chrono::TimeDelta;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;

/// Render a duration as hours, minutes and fractional seconds.
///
/// Zero units above the largest non-zero unit are dropped (`1m30s`, `2.5s`).
/// Sub-second values switch to `ms`, `µs` or `ns`. Zero renders as `0s`.
#[must_use]
pub fn format_duration(delta: TimeDelta) -> String {
    let nanos = delta.num_nanoseconds().unwrap_or(i64::MAX);
    if nanos == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    if nanos < 0 {
        out.push('-');
    }
    let nanos = nanos.unsigned_abs();

    if nanos < NANOS_PER_SEC {
        let (scale, unit) = if nanos < NANOS_PER_MICRO {
            (1, "ns")
        } else if nanos < NANOS_PER_MILLI {
            (NANOS_PER_MICRO, "µs")
        } else {
            (NANOS_PER_MILLI, "ms")
        };
        out.push_str(&fractional(nanos, scale));
        out.push_str(unit);
        return out;
    }

    let hours = nanos / NANOS_PER_HOUR;
    let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
    let seconds = nanos % NANOS_PER_MINUTE;

    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    out.push_str(&fractional(seconds, NANOS_PER_SEC));
    out.push('s');
    out
}

/// `value / scale` with the remainder as trimmed decimal digits.
fn fractional(value: u64, scale: u64) -> String {
    let whole = value / scale;
    let remainder = value % scale;
    if remainder == 0 {
        return whole.to_string();
    }

    let width = scale.ilog10() as usize;
    let digits = format!("{remainder:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
