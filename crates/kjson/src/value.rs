use core::fmt;
use std::{cmp::Ordering, str::FromStr};

use uuid::Uuid;

use crate::{
    error::{ParseError, ParseErrorKind},
    temporal,
};

/// A kJSON value.
///
/// The closed set of variants covers the JSON value model plus the extended
/// scalar types: arbitrary-precision integers and decimals, UUIDs,
/// nanosecond-precision instants, and calendar/clock durations.
///
/// Objects preserve insertion order and may carry duplicate keys; equality
/// and ordering canonicalize members by key, so member order never affects
/// comparison results.
#[derive(Debug, Clone)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// IEEE-754 double-precision number.
    Number(f64),
    /// String value.
    String(String),
    /// Arbitrary-precision signed integer.
    BigInt(BigInt),
    /// Arbitrary-precision signed decimal.
    Decimal128(Decimal128),
    /// 128-bit UUID.
    Uuid(Uuid),
    /// UTC timestamp with nanosecond precision.
    Instant(Instant),
    /// Calendar/clock duration.
    Duration(Duration),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Ordered sequence of key/value members.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Returns `true` if the value is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean if the value is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if the value is a `Number`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if the value is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if the value is an `Array`.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the members if the value is an `Object`.
    #[must_use]
    pub fn as_object(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Returns the integer if the value is a `BigInt`.
    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the decimal if the value is a `Decimal128`.
    #[must_use]
    pub fn as_decimal128(&self) -> Option<&Decimal128> {
        match self {
            Value::Decimal128(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the UUID if the value is a `Uuid`.
    #[must_use]
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Value::Uuid(u) => Some(u),
            _ => None,
        }
    }

    /// Returns the instant if the value is an `Instant`.
    #[must_use]
    pub fn as_instant(&self) -> Option<&Instant> {
        match self {
            Value::Instant(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the duration if the value is a `Duration`.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Value::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up the first member with the given key in an `Object`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members
                .iter()
                .find_map(|(k, v)| (k == key).then_some(v)),
            _ => None,
        }
    }

    /// The name of this value's type, as used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::BigInt(_) => "bigint",
            Value::Decimal128(_) => "decimal128",
            Value::Uuid(_) => "uuid",
            Value::Instant(_) => "instant",
            Value::Duration(_) => "duration",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::stringify(self, &crate::WriteOptions::default()))
    }
}

impl FromStr for Value {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Value, ParseError> {
        crate::parse(s)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Value {
        Value::Array(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Value {
        Value::BigInt(value)
    }
}

impl From<Decimal128> for Value {
    fn from(value: Decimal128) -> Value {
        Value::Decimal128(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Value {
        Value::Uuid(value)
    }
}

impl From<Instant> for Value {
    fn from(value: Instant) -> Value {
        Value::Instant(value)
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Value {
        Value::Duration(value)
    }
}

/// Arbitrary-precision signed integer: a sign plus a decimal digit string.
///
/// Digit strings are normalized on construction: leading zeros are stripped
/// and `-0` becomes `0`, so magnitude comparison by length is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    digits: String,
}

impl BigInt {
    /// Creates a `BigInt` from a sign and a decimal digit string.
    ///
    /// Non-digit bytes are ignored; an empty or all-zero digit string yields
    /// zero.
    #[must_use]
    pub fn new(negative: bool, digits: &str) -> BigInt {
        let normalized: String = digits
            .trim_start_matches('0')
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if normalized.is_empty() {
            BigInt {
                negative: false,
                digits: String::from("0"),
            }
        } else {
            BigInt {
                negative,
                digits: normalized,
            }
        }
    }

    /// `true` for negative values; zero is never negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The decimal digits of the magnitude, without sign or leading zeros.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.digits
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> BigInt {
        BigInt::new(value < 0, itoa::Buffer::new().format(value.unsigned_abs()))
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> BigInt {
        BigInt::new(false, itoa::Buffer::new().format(value))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &BigInt) -> Ordering {
        if self.negative != other.negative {
            return if self.negative {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        // No leading zeros, so a longer digit string is a larger magnitude.
        let magnitude = self
            .digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits));
        if self.negative {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &BigInt) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.digits)
    }
}

impl FromStr for BigInt {
    type Err = ParseError;

    /// Parses `[-]digits` with an optional `n` suffix.
    fn from_str(s: &str) -> Result<BigInt, ParseError> {
        let body = s.strip_suffix('n').unwrap_or(s);
        let (negative, digits) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::new(0, ParseErrorKind::InvalidNumber));
        }
        Ok(BigInt::new(negative, digits))
    }
}

/// Arbitrary-precision signed decimal: `digits × 10^exponent` with the sign
/// carried out of band.
///
/// The digit string is kept exactly as written (so text round-trips);
/// comparison and equality normalize away leading and trailing zeros.
#[derive(Debug, Clone)]
pub struct Decimal128 {
    negative: bool,
    exponent: i32,
    digits: String,
}

impl Decimal128 {
    /// Creates a decimal from a sign, power-of-ten exponent, and digit
    /// string. Non-digit bytes are dropped; an empty string yields zero.
    #[must_use]
    pub fn new(negative: bool, exponent: i32, digits: &str) -> Decimal128 {
        let mut digits: String = digits.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            digits.push('0');
        }
        Decimal128 {
            negative,
            exponent,
            digits,
        }
    }

    /// `true` for negative values.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The power-of-ten exponent applied to the digit string.
    #[must_use]
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// The decimal digits of the mantissa, as written.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Normalized view for numeric comparison: `None` for zero, otherwise
    /// the magnitude's decimal-point position and the significant digits
    /// with leading/trailing zeros stripped.
    pub(crate) fn normalized(&self) -> Option<(i64, &str)> {
        let bytes = self.digits.as_bytes();
        let first = bytes.iter().position(|b| *b != b'0')?;
        let last = bytes.iter().rposition(|b| *b != b'0')?;
        let trimmed = &self.digits[first..=last];
        let dropped_tail = bytes.len() - 1 - last;
        let scale = i64::from(self.exponent) + dropped_tail as i64 + trimmed.len() as i64;
        Some((scale, trimmed))
    }
}

impl Ord for Decimal128 {
    fn cmp(&self, other: &Decimal128) -> Ordering {
        match (self.normalized(), other.normalized()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => {
                if other.negative {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Some(_), None) => {
                if self.negative {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Some((scale_a, digits_a)), Some((scale_b, digits_b))) => {
                if self.negative != other.negative {
                    return if self.negative {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    };
                }
                let magnitude = scale_a
                    .cmp(&scale_b)
                    .then_with(|| compare_aligned_digits(digits_a, digits_b));
                if self.negative {
                    magnitude.reverse()
                } else {
                    magnitude
                }
            }
        }
    }
}

impl PartialOrd for Decimal128 {
    fn partial_cmp(&self, other: &Decimal128) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal128 {
    fn eq(&self, other: &Decimal128) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal128 {}

/// Compares two significant-digit strings as if left-aligned at the decimal
/// point, padding the shorter one with zeros.
fn compare_aligned_digits(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    for i in 0..a.len().max(b.len()) {
        let da = a.get(i).copied().unwrap_or(b'0');
        let db = b.get(i).copied().unwrap_or(b'0');
        match da.cmp(&db) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::stringify::write_decimal(f, self)
    }
}

impl FromStr for Decimal128 {
    type Err = ParseError;

    /// Parses `[-]digits[.digits][e[+-]digits]` with an optional `m` suffix.
    fn from_str(s: &str) -> Result<Decimal128, ParseError> {
        let body = s.strip_suffix('m').unwrap_or(s);
        let (negative, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let (mantissa, exp_text) = match body.split_once(['e', 'E']) {
            Some((mantissa, exp)) => (mantissa, Some(exp)),
            None => (body, None),
        };
        let mut exponent: i32 = match exp_text {
            Some(exp) => exp
                .parse()
                .map_err(|_| ParseError::new(0, ParseErrorKind::InvalidNumber))?,
            None => 0,
        };
        let digits = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => {
                if int_part.is_empty() || frac_part.is_empty() {
                    return Err(ParseError::new(0, ParseErrorKind::InvalidNumber));
                }
                exponent = exponent
                    .checked_sub(frac_part.len() as i32)
                    .ok_or_else(|| ParseError::new(0, ParseErrorKind::InvalidNumber))?;
                format!("{int_part}{frac_part}")
            }
            None => mantissa.to_string(),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::new(0, ParseErrorKind::InvalidNumber));
        }
        Ok(Decimal128::new(negative, exponent, &digits))
    }
}

/// A point on the UTC timeline with nanosecond precision.
///
/// The timezone offset is display metadata only: the stored nanosecond value
/// is always normalized to UTC, and comparison/equality ignore the offset.
#[derive(Debug, Clone, Copy)]
pub struct Instant {
    nanoseconds: i64,
    tz_offset_minutes: i16,
}

impl Instant {
    /// Creates an instant from nanoseconds since the Unix epoch (UTC).
    #[must_use]
    pub fn from_epoch_nanos(nanoseconds: i64) -> Instant {
        Instant {
            nanoseconds,
            tz_offset_minutes: 0,
        }
    }

    /// Creates an instant carrying a display timezone offset. `nanoseconds`
    /// must already be UTC-normalized.
    #[must_use]
    pub fn with_tz_offset(nanoseconds: i64, tz_offset_minutes: i16) -> Instant {
        Instant {
            nanoseconds,
            tz_offset_minutes,
        }
    }

    /// The current instant.
    #[must_use]
    pub fn now() -> Instant {
        use std::time::{SystemTime, UNIX_EPOCH};
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Instant::from_epoch_nanos(i64::try_from(since_epoch.as_nanos()).unwrap_or(i64::MAX))
    }

    /// Nanoseconds since the Unix epoch, UTC-normalized.
    #[must_use]
    pub fn epoch_nanos(&self) -> i64 {
        self.nanoseconds
    }

    /// The display timezone offset in minutes east of UTC.
    #[must_use]
    pub fn tz_offset_minutes(&self) -> i16 {
        self.tz_offset_minutes
    }

    /// Adds a duration, approximating a month as 30 days and a year as 365
    /// days. Returns `None` on overflow of the nanosecond timeline.
    #[must_use]
    pub fn checked_add(&self, duration: &Duration) -> Option<Instant> {
        let shifted = i128::from(self.nanoseconds) + duration.approx_total_nanos();
        Some(Instant {
            nanoseconds: i64::try_from(shifted).ok()?,
            tz_offset_minutes: self.tz_offset_minutes,
        })
    }
}

impl PartialEq for Instant {
    fn eq(&self, other: &Instant) -> bool {
        self.nanoseconds == other.nanoseconds
    }
}

impl Eq for Instant {}

impl Ord for Instant {
    fn cmp(&self, other: &Instant) -> Ordering {
        self.nanoseconds.cmp(&other.nanoseconds)
    }
}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Instant) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        temporal::write_instant(f, self)
    }
}

impl FromStr for Instant {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Instant, ParseError> {
        temporal::parse_instant(s).ok_or_else(|| ParseError::new(0, ParseErrorKind::InvalidNumber))
    }
}

/// A signed calendar/clock interval.
///
/// Calendar components (years, months, days) are kept separate from clock
/// components because their exact length depends on the calendar; ordering
/// uses the same fixed approximation as instant arithmetic (month = 30 days,
/// year = 365 days).
#[derive(Debug, Clone, Copy, Default)]
pub struct Duration {
    /// Years component.
    pub years: i32,
    /// Months component.
    pub months: i32,
    /// Days component.
    pub days: i32,
    /// Hours component.
    pub hours: i32,
    /// Minutes component.
    pub minutes: i32,
    /// Seconds and fractional seconds, as nanoseconds.
    pub nanoseconds: i64,
    /// `true` if the whole interval is negated.
    pub negative: bool,
}

impl Duration {
    /// A duration of whole nanoseconds.
    #[must_use]
    pub fn from_nanos(nanoseconds: i64) -> Duration {
        Duration {
            nanoseconds: nanoseconds.abs(),
            negative: nanoseconds < 0,
            ..Duration::default()
        }
    }

    /// A duration of whole days.
    #[must_use]
    pub fn from_days(days: i32) -> Duration {
        Duration {
            days: days.abs(),
            negative: days < 0,
            ..Duration::default()
        }
    }

    /// `true` if every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.nanoseconds == 0
    }

    /// The same interval with the sign flipped.
    #[must_use]
    pub fn negated(&self) -> Duration {
        Duration {
            negative: !self.negative,
            ..*self
        }
    }

    /// The magnitude of the interval.
    #[must_use]
    pub fn abs(&self) -> Duration {
        Duration {
            negative: false,
            ..*self
        }
    }

    /// Signed projection onto nanoseconds, with a month approximated as 30
    /// days and a year as 365 days. Ordering and equality both use this
    /// projection, so they always agree.
    #[must_use]
    pub fn approx_total_nanos(&self) -> i128 {
        let days = i128::from(self.days)
            + i128::from(self.months) * 30
            + i128::from(self.years) * 365;
        let total = days * temporal::NANOS_PER_DAY
            + i128::from(self.hours) * temporal::NANOS_PER_HOUR
            + i128::from(self.minutes) * temporal::NANOS_PER_MINUTE
            + i128::from(self.nanoseconds);
        if self.negative {
            -total
        } else {
            total
        }
    }
}

impl PartialEq for Duration {
    fn eq(&self, other: &Duration) -> bool {
        self.approx_total_nanos() == other.approx_total_nanos()
    }
}

impl Eq for Duration {}

impl Ord for Duration {
    fn cmp(&self, other: &Duration) -> Ordering {
        self.approx_total_nanos().cmp(&other.approx_total_nanos())
    }
}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Duration) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        temporal::write_duration(f, self)
    }
}

impl FromStr for Duration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Duration, ParseError> {
        temporal::parse_duration(s).ok_or_else(|| ParseError::new(0, ParseErrorKind::InvalidNumber))
    }
}

/// Generates a random (version 4) UUID.
#[must_use]
pub fn uuid_v4() -> Uuid {
    Uuid::new_v4()
}

/// Generates a timestamp-ordered (version 7) UUID.
#[must_use]
pub fn uuid_v7() -> Uuid {
    Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0", "0")]
    #[test_case("0000", "0")]
    #[test_case("007", "7")]
    #[test_case("123", "123")]
    fn bigint_normalizes_leading_zeros(input: &str, expected: &str) {
        assert_eq!(BigInt::new(false, input).digits(), expected);
    }

    #[test]
    fn bigint_negative_zero_is_zero() {
        let value = BigInt::new(true, "000");
        assert!(!value.is_negative());
        assert_eq!(value, BigInt::from(0_i64));
    }

    #[test_case("2", "10", Ordering::Less; "shorter magnitude is smaller")]
    #[test_case("10", "2", Ordering::Greater)]
    #[test_case("19", "21", Ordering::Less)]
    fn bigint_magnitude_ordering(a: &str, b: &str, expected: Ordering) {
        assert_eq!(BigInt::new(false, a).cmp(&BigInt::new(false, b)), expected);
        assert_eq!(
            BigInt::new(true, a).cmp(&BigInt::new(true, b)),
            expected.reverse()
        );
    }

    #[test]
    fn decimal_equality_is_numeric() {
        // 99.99 == 9999e-2 == 999900e-4 (the parse of "999.900e-1m")
        let a = Decimal128::new(false, -2, "9999");
        let b = Decimal128::new(false, -4, "999900");
        assert_eq!(a, b);
        let c = Decimal128::new(false, -2, "9998");
        assert_ne!(a, c);
    }

    #[test]
    fn decimal_zero_ignores_sign_and_exponent() {
        assert_eq!(
            Decimal128::new(true, 5, "000"),
            Decimal128::new(false, -3, "0")
        );
    }

    #[test_case(false, -2, "9999", false, 0, "100", Ordering::Less; "99.99 lt 100")]
    #[test_case(false, 2, "15", false, 0, "1499", Ordering::Greater; "1500 gt 1499")]
    #[test_case(true, 0, "1", false, -9, "1", Ordering::Less; "negative lt tiny positive")]
    fn decimal_ordering(
        neg_a: bool,
        exp_a: i32,
        dig_a: &str,
        neg_b: bool,
        exp_b: i32,
        dig_b: &str,
        expected: Ordering,
    ) {
        let a = Decimal128::new(neg_a, exp_a, dig_a);
        let b = Decimal128::new(neg_b, exp_b, dig_b);
        assert_eq!(a.cmp(&b), expected);
    }

    #[test]
    fn instant_equality_ignores_tz_offset() {
        let utc = Instant::from_epoch_nanos(1_000);
        let offset = Instant::with_tz_offset(1_000, -480);
        assert_eq!(utc, offset);
    }

    #[test]
    fn duration_month_equals_thirty_days() {
        let month = Duration {
            months: 1,
            ..Duration::default()
        };
        assert_eq!(month, Duration::from_days(30));
        assert!(month < Duration::from_days(31));
    }

    #[test]
    fn instant_plus_duration() {
        let start = Instant::from_epoch_nanos(0);
        let day = Duration::from_days(1);
        assert_eq!(
            start.checked_add(&day).unwrap().epoch_nanos(),
            86_400_000_000_000
        );
        assert_eq!(
            start.checked_add(&day.negated()).unwrap().epoch_nanos(),
            -86_400_000_000_000
        );
    }

    #[test]
    fn uuid_generators_set_version_bits() {
        assert_eq!(uuid_v4().get_version_num(), 4);
        assert_eq!(uuid_v7().get_version_num(), 7);
    }
}
