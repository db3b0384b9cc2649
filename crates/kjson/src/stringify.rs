//! Value-to-text rendering.
//!
//! Stringification is total: every well-formed [`Value`] renders without
//! error. `NaN` and infinities become `null` (accepted information loss;
//! the text format has no representation for them).

use core::fmt::{self, Write};

use crate::{
    temporal,
    value::{Decimal128, Value},
};

/// Rendering options for [`stringify`].
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Spaces per nesting level. `0` renders compact output; any other
    /// value renders one element per line with a trailing comma before
    /// each closing bracket/brace.
    pub indent: usize,
    /// Quote every object key, even keys valid as identifiers.
    pub quote_keys: bool,
    /// Emit the `n` suffix on BigInt values. Without it a reparse yields
    /// a `Number`.
    pub bigint_suffix: bool,
    /// Emit the `m` suffix on Decimal128 values.
    pub decimal_suffix: bool,
    /// Force single quotes instead of picking the cheapest quote.
    pub use_single_quotes: bool,
    /// Escape every non-ASCII character as `\uXXXX` (surrogate pairs for
    /// astral-plane characters), keeping the output pure ASCII.
    pub escape_unicode: bool,
}

impl Default for WriteOptions {
    fn default() -> WriteOptions {
        WriteOptions {
            indent: 0,
            quote_keys: false,
            bigint_suffix: true,
            decimal_suffix: true,
            use_single_quotes: false,
            escape_unicode: false,
        }
    }
}

impl WriteOptions {
    /// Two-space pretty printing with default literal rendering.
    #[must_use]
    pub fn pretty() -> WriteOptions {
        WriteOptions {
            indent: 2,
            ..WriteOptions::default()
        }
    }
}

/// Renders a value as kJSON text.
#[must_use]
pub fn stringify(value: &Value, options: &WriteOptions) -> String {
    let mut out = String::new();
    write_value(&mut out, value, options, 0).expect("writing to a String never fails");
    out
}

fn write_value(
    out: &mut String,
    value: &Value,
    options: &WriteOptions,
    depth: usize,
) -> fmt::Result {
    match value {
        Value::Null => out.write_str("null"),
        Value::Bool(true) => out.write_str("true"),
        Value::Bool(false) => out.write_str("false"),
        Value::Number(number) => write_number(out, *number),
        Value::String(string) => write_string(out, string, options),
        Value::BigInt(bigint) => {
            if bigint.is_negative() {
                out.write_char('-')?;
            }
            out.write_str(bigint.digits())?;
            if options.bigint_suffix {
                out.write_char('n')?;
            }
            Ok(())
        }
        Value::Decimal128(decimal) => {
            write_decimal(out, decimal)?;
            if options.decimal_suffix {
                out.write_char('m')?;
            }
            Ok(())
        }
        Value::Uuid(uuid) => write!(out, "{uuid}"),
        Value::Instant(instant) => temporal::write_instant(out, instant),
        Value::Duration(duration) => temporal::write_duration(out, duration),
        Value::Array(items) => write_array(out, items, options, depth),
        Value::Object(members) => write_object(out, members, options, depth),
    }
}

fn write_number(out: &mut String, number: f64) -> fmt::Result {
    if number.is_finite() {
        write!(out, "{number}")
    } else {
        out.write_str("null")
    }
}

fn write_array(
    out: &mut String,
    items: &[Value],
    options: &WriteOptions,
    depth: usize,
) -> fmt::Result {
    if items.is_empty() {
        return out.write_str("[]");
    }
    out.write_char('[')?;
    for (i, item) in items.iter().enumerate() {
        if options.indent > 0 {
            write_newline_indent(out, options, depth + 1)?;
        } else if i > 0 {
            out.write_char(',')?;
        }
        write_value(out, item, options, depth + 1)?;
        if options.indent > 0 {
            out.write_char(',')?;
        }
    }
    if options.indent > 0 {
        write_newline_indent(out, options, depth)?;
    }
    out.write_char(']')
}

fn write_object(
    out: &mut String,
    members: &[(String, Value)],
    options: &WriteOptions,
    depth: usize,
) -> fmt::Result {
    if members.is_empty() {
        return out.write_str("{}");
    }
    out.write_char('{')?;
    for (i, (key, value)) in members.iter().enumerate() {
        if options.indent > 0 {
            write_newline_indent(out, options, depth + 1)?;
        } else if i > 0 {
            out.write_char(',')?;
        }
        if options.quote_keys || needs_quotes(key) {
            write_string(out, key, options)?;
        } else {
            out.write_str(key)?;
        }
        out.write_char(':')?;
        if options.indent > 0 {
            out.write_char(' ')?;
        }
        write_value(out, value, options, depth + 1)?;
        if options.indent > 0 {
            out.write_char(',')?;
        }
    }
    if options.indent > 0 {
        write_newline_indent(out, options, depth)?;
    }
    out.write_char('}')
}

fn write_newline_indent(out: &mut String, options: &WriteOptions, depth: usize) -> fmt::Result {
    out.write_char('\n')?;
    for _ in 0..options.indent * depth {
        out.write_char(' ')?;
    }
    Ok(())
}

/// `true` if a key cannot be written as a bare identifier.
fn needs_quotes(key: &str) -> bool {
    let mut bytes = key.bytes();
    match bytes.next() {
        None => true,
        Some(first) if !(first.is_ascii_alphabetic() || first == b'_' || first == b'$') => true,
        Some(_) => !bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$'),
    }
}

/// Picks the quote that needs the least escaping. kJSON text is often
/// re-embedded in another quoting context, so single quotes carry double
/// weight; ties resolve double, then backtick, then single.
fn select_quote(string: &str, options: &WriteOptions) -> char {
    if options.use_single_quotes {
        return '\'';
    }
    let mut doubles = 0_usize;
    let mut singles = 0_usize;
    let mut backticks = 0_usize;
    let mut backslashes = 0_usize;
    for byte in string.bytes() {
        match byte {
            b'"' => doubles += 1,
            b'\'' => singles += 1,
            b'`' => backticks += 1,
            b'\\' => backslashes += 1,
            _ => {}
        }
    }
    let double_cost = doubles + backslashes;
    let backtick_cost = backticks + backslashes;
    let single_cost = singles * 2 + backslashes;
    if double_cost <= backtick_cost && double_cost <= single_cost {
        '"'
    } else if backtick_cost <= single_cost {
        '`'
    } else {
        '\''
    }
}

fn write_string(out: &mut String, string: &str, options: &WriteOptions) -> fmt::Result {
    let quote = select_quote(string, options);
    out.write_char(quote)?;
    for ch in string.chars() {
        match ch {
            '\\' => out.write_str("\\\\")?,
            ch if ch == quote => {
                out.write_char('\\')?;
                out.write_char(quote)?;
            }
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            ch if (ch as u32) < 0x20 => write!(out, "\\u{:04x}", ch as u32)?,
            ch if options.escape_unicode && !ch.is_ascii() => {
                let mut units = [0_u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(out, "\\u{unit:04x}")?;
                }
            }
            ch => out.write_char(ch)?,
        }
    }
    out.write_char(quote)
}

/// Writes a decimal mantissa with the point reinserted at
/// `len(digits) + exponent`, without sign handling for zero and without
/// the `m` suffix.
pub(crate) fn write_decimal<W: Write>(out: &mut W, decimal: &Decimal128) -> fmt::Result {
    if decimal.is_negative() {
        out.write_char('-')?;
    }
    let digits = decimal.digits();
    let exponent = i64::from(decimal.exponent());
    if exponent >= 0 {
        out.write_str(digits)?;
        for _ in 0..exponent {
            out.write_char('0')?;
        }
        return Ok(());
    }
    let point_pos = digits.len() as i64 + exponent;
    if point_pos <= 0 {
        out.write_str("0.")?;
        for _ in 0..-point_pos {
            out.write_char('0')?;
        }
        out.write_str(digits)
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let split = point_pos as usize;
        out.write_str(&digits[..split])?;
        out.write_char('.')?;
        out.write_str(&digits[split..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use test_case::test_case;

    fn compact(text: &str) -> String {
        stringify(&parse(text).unwrap(), &WriteOptions::default())
    }

    #[test_case("null")]
    #[test_case("true")]
    #[test_case("false")]
    #[test_case("42")]
    #[test_case("-0.5")]
    #[test_case("99.99m")]
    #[test_case("123456789012345678901234567890n")]
    #[test_case("-42n")]
    #[test_case("550e8400-e29b-41d4-a716-446655440000")]
    #[test_case("2025-01-15T10:30:00.123456789Z")]
    #[test_case("P1Y2M3DT4H5M6S")]
    #[test_case("[1,2,3]")]
    #[test_case("{a:1,b:[true,null]}")]
    fn compact_is_stable(text: &str) {
        assert_eq!(compact(text), text);
    }

    #[test_case(f64::NAN; "nan")]
    #[test_case(f64::INFINITY; "positive infinity")]
    #[test_case(f64::NEG_INFINITY; "negative infinity")]
    fn non_finite_numbers_become_null(number: f64) {
        assert_eq!(
            stringify(&Value::Number(number), &WriteOptions::default()),
            "null"
        );
    }

    #[test_case(-2, "9999", "99.99")]
    #[test_case(0, "42", "42")]
    #[test_case(2, "15", "1500")]
    #[test_case(-5, "123", "0.00123")]
    #[test_case(-3, "123", "0.123")]
    fn decimal_point_reinsertion(exponent: i32, digits: &str, expected: &str) {
        let decimal = Decimal128::new(false, exponent, digits);
        let mut out = String::new();
        write_decimal(&mut out, &decimal).unwrap();
        assert_eq!(out, expected);
    }

    #[test_case("plain", "\"plain\""; "no escapes picks double")]
    #[test_case("say \"hi\"", "`say \"hi\"`"; "doubles push to backtick")]
    #[test_case("it's", "\"it's\""; "singles stay double")]
    #[test_case("a\"b`c", "'a\"b`c'"; "doubles and backticks push to single")]
    fn quote_selection(input: &str, expected: &str) {
        assert_eq!(
            stringify(&Value::String(input.to_string()), &WriteOptions::default()),
            expected
        );
    }

    #[test]
    fn quote_tie_prefers_double_then_backtick() {
        // One of each quote character: double and backtick tie at cost 1,
        // single costs 2.
        let input = "\"'`";
        assert_eq!(
            stringify(&Value::String(input.to_string()), &WriteOptions::default()),
            "\"\\\"'`\""
        );
    }

    #[test]
    fn forced_single_quotes() {
        let options = WriteOptions {
            use_single_quotes: true,
            ..WriteOptions::default()
        };
        assert_eq!(
            stringify(&Value::String("it's".to_string()), &options),
            "'it\\'s'"
        );
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(
            stringify(
                &Value::String("a\nb\t\u{1}".to_string()),
                &WriteOptions::default()
            ),
            "\"a\\nb\\t\\u0001\""
        );
    }

    #[test]
    fn escape_unicode_uses_surrogate_pairs() {
        let options = WriteOptions {
            escape_unicode: true,
            ..WriteOptions::default()
        };
        assert_eq!(
            stringify(&Value::String("é😀".to_string()), &options),
            "\"\\u00e9\\ud83d\\ude00\""
        );
    }

    #[test]
    fn keys_are_quoted_only_when_needed() {
        let value = parse("{\"a b\": 1, plain: 2}").unwrap();
        assert_eq!(
            stringify(&value, &WriteOptions::default()),
            "{\"a b\":1,plain:2}"
        );
        let options = WriteOptions {
            quote_keys: true,
            ..WriteOptions::default()
        };
        assert_eq!(stringify(&value, &options), "{\"a b\":1,\"plain\":2}");
    }

    #[test]
    fn pretty_mode_uses_trailing_commas() {
        let value = parse("{a:[1,2],b:{}}").unwrap();
        let expected = "{\n  a: [\n    1,\n    2,\n  ],\n  b: {},\n}";
        assert_eq!(stringify(&value, &WriteOptions::pretty()), expected);
    }

    #[test]
    fn suffixes_can_be_suppressed() {
        let options = WriteOptions {
            bigint_suffix: false,
            decimal_suffix: false,
            ..WriteOptions::default()
        };
        assert_eq!(stringify(&parse("42n").unwrap(), &options), "42");
        assert_eq!(stringify(&parse("99.99m").unwrap(), &options), "99.99");
    }
}
