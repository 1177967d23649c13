//! Line codec for the progress log
//!
//! # Line Format
//!
//! ```text
//! <YYYY-MM-DD HH:MM:SS> - <value with 3 decimals>%
//! <YYYY-MM-DD HH:MM:SS> - NaN%
//! ```
//!
//! Decoding never fails hard: a line that does not match is simply not a
//! reading. The log may end in a partially written line or hold lines from
//! older formats, and neither should hide the rest of the history.

use crate::types::{History, Percent, Reading, Sample, Timestamp};

/// Separator between the timestamp and value fields
pub const SEPARATOR: &str = " - ";

/// Value token written when the source was unavailable
pub const UNAVAILABLE_TOKEN: &str = "NaN";

/// Encode a reading as one log line, without the trailing newline
#[must_use]
pub fn encode(reading: &Reading) -> String {
    match reading.sample {
        Sample::Percent(p) => format!("{}{}{:.3}%", reading.timestamp, SEPARATOR, p.get()),
        Sample::Unavailable => {
            format!("{}{}{}%", reading.timestamp, SEPARATOR, UNAVAILABLE_TOKEN)
        }
    }
}

/// Decode one log line
///
/// Returns `None` for malformed lines. `NaN` decodes to an unavailable
/// reading; infinities and non-numbers are malformed.
#[must_use]
pub fn decode(line: &str) -> Option<Reading> {
    let line = line.trim();
    let mut parts = line.split(SEPARATOR);
    let (ts_part, value_part) = match (parts.next(), parts.next(), parts.next()) {
        (Some(ts), Some(value), None) => (ts, value),
        _ => return None,
    };

    let timestamp = Timestamp::parse(ts_part.trim())?;
    let sample = decode_value(value_part.trim().trim_end_matches('%'))?;

    Some(Reading::new(timestamp, sample))
}

/// Decode the value field (already stripped of `%`)
fn decode_value(raw: &str) -> Option<Sample> {
    if raw.eq_ignore_ascii_case(UNAVAILABLE_TOKEN) {
        return Some(Sample::Unavailable);
    }
    // f64::from_str also accepts "inf"/"nan" spellings; only finite values count
    let value: f64 = raw.parse().ok()?;
    Percent::new(value).map(Sample::Percent)
}

/// Decode every line of a log, in order, skipping malformed lines
pub fn decode_lines(text: &str) -> impl Iterator<Item = Reading> + '_ {
    text.lines().filter_map(decode)
}

/// Build a [`History`] from the full log contents
#[must_use]
pub fn decode_history(text: &str) -> History {
    decode_lines(text).collect()
}
