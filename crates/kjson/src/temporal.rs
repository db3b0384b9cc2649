//! ISO-8601 parsing and formatting for [`Instant`] and [`Duration`].
//!
//! Instants are scanned field by field rather than matched against a
//! pattern, so parse time stays linear in the input length. The stored
//! nanosecond value is always normalized to UTC; a parsed offset is kept
//! only as display metadata.

use core::fmt::{self, Write};

use chrono::{DateTime, Datelike, NaiveDate, Timelike};

use crate::value::{Duration, Instant};

pub(crate) const NANOS_PER_SEC: i128 = 1_000_000_000;
pub(crate) const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SEC;
pub(crate) const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
pub(crate) const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

fn digits_at(bytes: &[u8], start: usize, len: usize) -> Option<u32> {
    let slice = bytes.get(start..start + len)?;
    let mut out: u32 = 0;
    for byte in slice {
        if !byte.is_ascii_digit() {
            return None;
        }
        out = out * 10 + u32::from(byte - b'0');
    }
    Some(out)
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.fraction][Z|±HH[:?MM]]` into an instant.
///
/// A missing zone designator means UTC. The fraction keeps at most nine
/// digits; extra digits are truncated toward zero.
pub(crate) fn parse_instant(text: &str) -> Option<Instant> {
    let bytes = text.as_bytes();
    if bytes.len() < 19
        || bytes[4] != b'-'
        || bytes[7] != b'-'
        || bytes[10] != b'T'
        || bytes[13] != b':'
        || bytes[16] != b':'
    {
        return None;
    }
    let year = digits_at(bytes, 0, 4)?;
    let month = digits_at(bytes, 5, 2)?;
    let day = digits_at(bytes, 8, 2)?;
    let hour = digits_at(bytes, 11, 2)?;
    let minute = digits_at(bytes, 14, 2)?;
    let second = digits_at(bytes, 17, 2)?;

    let mut pos = 19;
    let mut frac_nanos: u32 = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == start {
            return None;
        }
        for (i, byte) in bytes[start..pos].iter().take(9).enumerate() {
            frac_nanos += u32::from(byte - b'0') * 10_u32.pow(8 - i as u32);
        }
    }

    let tz_offset_minutes: i16 = match bytes.get(pos) {
        None => 0,
        Some(b'Z') => {
            pos += 1;
            0
        }
        Some(sign @ (b'+' | b'-')) => {
            let negative = *sign == b'-';
            pos += 1;
            let hours = digits_at(bytes, pos, 2)?;
            pos += 2;
            let minutes = match bytes.get(pos) {
                Some(b':') => {
                    pos += 1;
                    let m = digits_at(bytes, pos, 2)?;
                    pos += 2;
                    m
                }
                Some(b) if b.is_ascii_digit() => {
                    let m = digits_at(bytes, pos, 2)?;
                    pos += 2;
                    m
                }
                _ => 0,
            };
            if hours > 23 || minutes > 59 {
                return None;
            }
            let total = i16::try_from(hours * 60 + minutes).ok()?;
            if negative {
                -total
            } else {
                total
            }
        }
        Some(_) => return None,
    };
    if pos != bytes.len() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    let local_seconds = date.and_hms_opt(hour, minute, second)?.and_utc().timestamp();
    let utc_seconds = local_seconds.checked_sub(i64::from(tz_offset_minutes) * 60)?;
    let nanoseconds = utc_seconds
        .checked_mul(1_000_000_000)?
        .checked_add(i64::from(frac_nanos))?;
    Some(Instant::with_tz_offset(nanoseconds, tz_offset_minutes))
}

/// Writes an instant as `YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ`, always in UTC
/// with a full nine-digit fraction.
pub(crate) fn write_instant<W: Write>(out: &mut W, instant: &Instant) -> fmt::Result {
    let nanoseconds = instant.epoch_nanos();
    let seconds = nanoseconds.div_euclid(1_000_000_000);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let fraction = nanoseconds.rem_euclid(1_000_000_000) as u32;
    let datetime = DateTime::from_timestamp(seconds, fraction)
        .expect("every i64 nanosecond timestamp is within the chrono date range");
    write!(
        out,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:09}Z",
        datetime.year(),
        datetime.month(),
        datetime.day(),
        datetime.hour(),
        datetime.minute(),
        datetime.second(),
        fraction
    )
}

/// Parses an ISO-8601 duration: `[-]P[nY][nM][nW][nD][T[nH][nM][n[.f]S]]`.
///
/// Weeks fold into the days component. At least one component is required;
/// a fraction is only valid on seconds.
pub(crate) fn parse_duration(text: &str) -> Option<Duration> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let negative = bytes.first() == Some(&b'-');
    if negative {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'P') {
        return None;
    }
    pos += 1;

    let mut duration = Duration {
        negative,
        ..Duration::default()
    };
    let mut in_time = false;
    let mut components = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'T' {
            if in_time {
                return None;
            }
            in_time = true;
            pos += 1;
            continue;
        }
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == start {
            return None;
        }
        let whole: i64 = text[start..pos].parse().ok()?;
        let mut frac_nanos: u32 = 0;
        if bytes.get(pos) == Some(&b'.') {
            pos += 1;
            let frac_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == frac_start || bytes.get(pos) != Some(&b'S') || !in_time {
                return None;
            }
            for (i, byte) in bytes[frac_start..pos].iter().take(9).enumerate() {
                frac_nanos += u32::from(byte - b'0') * 10_u32.pow(8 - i as u32);
            }
        }
        let unit = *bytes.get(pos)?;
        pos += 1;
        components += 1;
        let small = i32::try_from(whole).ok();
        match (in_time, unit) {
            (false, b'Y') => duration.years = duration.years.checked_add(small?)?,
            (false, b'M') => duration.months = duration.months.checked_add(small?)?,
            (false, b'W') => duration.days = duration.days.checked_add(small?.checked_mul(7)?)?,
            (false, b'D') => duration.days = duration.days.checked_add(small?)?,
            (true, b'H') => duration.hours = duration.hours.checked_add(small?)?,
            (true, b'M') => duration.minutes = duration.minutes.checked_add(small?)?,
            (true, b'S') => {
                let nanos = whole
                    .checked_mul(1_000_000_000)?
                    .checked_add(i64::from(frac_nanos))?;
                duration.nanoseconds = duration.nanoseconds.checked_add(nanos)?;
            }
            _ => return None,
        }
    }
    if components == 0 {
        return None;
    }
    Some(duration)
}

/// Writes a duration in ISO-8601 form, omitting zero components. A zero
/// duration becomes `PT0S` (`-PT0S` if the sign flag is set).
pub(crate) fn write_duration<W: Write>(out: &mut W, duration: &Duration) -> fmt::Result {
    if duration.negative {
        out.write_char('-')?;
    }
    out.write_char('P')?;
    if duration.is_zero() {
        return out.write_str("T0S");
    }
    let mut buffer = itoa::Buffer::new();
    if duration.years != 0 {
        out.write_str(buffer.format(duration.years))?;
        out.write_char('Y')?;
    }
    if duration.months != 0 {
        out.write_str(buffer.format(duration.months))?;
        out.write_char('M')?;
    }
    if duration.days != 0 {
        out.write_str(buffer.format(duration.days))?;
        out.write_char('D')?;
    }
    if duration.hours != 0 || duration.minutes != 0 || duration.nanoseconds != 0 {
        out.write_char('T')?;
        if duration.hours != 0 {
            out.write_str(buffer.format(duration.hours))?;
            out.write_char('H')?;
        }
        if duration.minutes != 0 {
            out.write_str(buffer.format(duration.minutes))?;
            out.write_char('M')?;
        }
        if duration.nanoseconds != 0 {
            let seconds = duration.nanoseconds / 1_000_000_000;
            let fraction = duration.nanoseconds % 1_000_000_000;
            out.write_str(buffer.format(seconds))?;
            if fraction != 0 {
                let digits = format!("{fraction:09}");
                out.write_char('.')?;
                out.write_str(digits.trim_end_matches('0'))?;
            }
            out.write_char('S')?;
        }
    }
    Ok(())
}
