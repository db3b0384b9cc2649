//! Recursive-descent parser for kJSON text.
//!
//! The grammar is the JSON value set plus JSON5 conveniences: comments,
//! trailing commas, unquoted object keys, and three string quote styles.
//! Unquoted literals that share a leading character class (numbers, UUIDs,
//! instants, durations) are disambiguated by bounded lookahead with a
//! word-boundary
//! check; a candidate that does not pan out falls through to number
//! parsing instead of erroring. Lookahead never backtracks inside a
//! candidate, so parse time stays linear.

use uuid::Uuid;

use crate::{
    error::{ParseError, ParseErrorKind},
    temporal,
    value::{BigInt, Decimal128, Value},
};

/// Parses a single kJSON value from `text`.
///
/// Exactly one value must be present; anything other than whitespace or
/// comments after it is a `TrailingData` error.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut parser = Parser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
    };
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.pos != parser.bytes.len() {
        return Err(ParseError::new(parser.pos, ParseErrorKind::TrailingData));
    }
    Ok(value)
}

/// Parses a single kJSON value from raw bytes, validating UTF-8 first.
pub fn parse_bytes(bytes: &[u8]) -> Result<Value, ParseError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|error| ParseError::new(error.valid_up_to(), ParseErrorKind::InvalidUtf8))?;
    parse(text)
}

fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$'
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eof(&self) -> ParseError {
        ParseError::new(self.pos, ParseErrorKind::UnexpectedEof)
    }

    /// `true` if the byte at `offset` cannot continue an identifier, so a
    /// literal candidate ending just before it is properly delimited.
    fn at_word_boundary(&self, offset: usize) -> bool {
        match self.bytes.get(offset) {
            None => true,
            Some(byte) => !is_identifier_byte(*byte),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            while let Some(byte) = self.peek() {
                if matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.peek() != Some(b'/') {
                return Ok(());
            }
            match self.bytes.get(self.pos + 1) {
                Some(b'/') => {
                    self.pos += 2;
                    while let Some(byte) = self.peek() {
                        self.pos += 1;
                        if byte == b'\n' {
                            break;
                        }
                    }
                }
                Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => {
                                return Err(ParseError::new(
                                    start,
                                    ParseErrorKind::UnterminatedComment,
                                ));
                            }
                            Some(b'*') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                // A lone `/` is not trivia; the caller reports it.
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            None => Err(self.eof()),
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"' | b'\'' | b'`') => self.parse_string().map(Value::String),
            Some(b't') => self.parse_keyword("true", Value::Bool(true)),
            Some(b'n') => self.parse_keyword("null", Value::Null),
            Some(b'f') => {
                // `false` and hex-leading UUIDs share a first byte.
                if self.matches_keyword("false") {
                    self.pos += 5;
                    return Ok(Value::Bool(false));
                }
                match self.try_uuid() {
                    Some(uuid) => Ok(Value::Uuid(uuid)),
                    None => Err(ParseError::new(
                        self.pos,
                        ParseErrorKind::UnexpectedCharacter(b'f'),
                    )),
                }
            }
            Some(b'P') => match self.try_duration() {
                Some(duration) => Ok(Value::Duration(duration)),
                None => Err(ParseError::new(
                    self.pos,
                    ParseErrorKind::UnexpectedCharacter(b'P'),
                )),
            },
            Some(byte @ (b'a'..=b'e' | b'A'..=b'F')) => match self.try_uuid() {
                Some(uuid) => Ok(Value::Uuid(uuid)),
                None => Err(ParseError::new(
                    self.pos,
                    ParseErrorKind::UnexpectedCharacter(byte),
                )),
            },
            Some(b'0'..=b'9' | b'-') => self.parse_scalar_literal(),
            Some(byte) => Err(ParseError::new(
                self.pos,
                ParseErrorKind::UnexpectedCharacter(byte),
            )),
        }
    }

    fn matches_keyword(&self, word: &str) -> bool {
        self.bytes[self.pos..].starts_with(word.as_bytes())
            && self.at_word_boundary(self.pos + word.len())
    }

    fn parse_keyword(&mut self, word: &str, value: Value) -> Result<Value, ParseError> {
        if self.matches_keyword(word) {
            self.pos += word.len();
            Ok(value)
        } else {
            Err(ParseError::new(
                self.pos,
                ParseErrorKind::UnexpectedCharacter(self.bytes[self.pos]),
            ))
        }
    }

    /// Unquoted literal starting with a digit or `-`: try a UUID, then an
    /// instant, then a negated duration, then fall back to a number.
    fn parse_scalar_literal(&mut self) -> Result<Value, ParseError> {
        if let Some(uuid) = self.try_uuid() {
            return Ok(Value::Uuid(uuid));
        }
        if let Some(instant) = self.try_instant() {
            return Ok(Value::Instant(instant));
        }
        if let Some(duration) = self.try_duration() {
            return Ok(Value::Duration(duration));
        }
        self.parse_number()
    }

    /// Matches a canonical 36-character hyphenated UUID at the current
    /// position, requiring a word boundary after it.
    fn try_uuid(&mut self) -> Option<Uuid> {
        let candidate = self.bytes.get(self.pos..self.pos + 36)?;
        for (i, byte) in candidate.iter().enumerate() {
            match i {
                8 | 13 | 18 | 23 => {
                    if *byte != b'-' {
                        return None;
                    }
                }
                _ => {
                    if !byte.is_ascii_hexdigit() {
                        return None;
                    }
                }
            }
        }
        if !self.at_word_boundary(self.pos + 36) {
            return None;
        }
        let uuid = Uuid::try_parse(&self.text[self.pos..self.pos + 36]).ok()?;
        self.pos += 36;
        Some(uuid)
    }

    /// Matches an ISO-8601 instant at the current position: a `YYYY-MM-DDT`
    /// prefix, then a run of time/offset characters, then a word boundary.
    fn try_instant(&mut self) -> Option<crate::Instant> {
        let prefix = self.bytes.get(self.pos..self.pos + 11)?;
        let date_shape = prefix[..4].iter().all(u8::is_ascii_digit)
            && prefix[4] == b'-'
            && prefix[5..7].iter().all(u8::is_ascii_digit)
            && prefix[7] == b'-'
            && prefix[8..10].iter().all(u8::is_ascii_digit)
            && prefix[10] == b'T';
        if !date_shape {
            return None;
        }
        let mut end = self.pos + 11;
        while let Some(byte) = self.bytes.get(end) {
            if byte.is_ascii_digit() || matches!(byte, b':' | b'.' | b'+' | b'-' | b'Z') {
                end += 1;
            } else {
                break;
            }
        }
        if !self.at_word_boundary(end) {
            return None;
        }
        let instant = temporal::parse_instant(&self.text[self.pos..end])?;
        self.pos = end;
        Some(instant)
    }

    /// Matches an ISO-8601 duration (`[-]P...`) at the current position,
    /// requiring a word boundary after it.
    fn try_duration(&mut self) -> Option<crate::Duration> {
        let mut end = self.pos;
        if self.bytes.get(end) == Some(&b'-') {
            end += 1;
        }
        if self.bytes.get(end) != Some(&b'P') {
            return None;
        }
        end += 1;
        while let Some(byte) = self.bytes.get(end) {
            if byte.is_ascii_digit() || matches!(byte, b'.' | b'T' | b'Y' | b'M' | b'W' | b'D' | b'H' | b'S') {
                end += 1;
            } else {
                break;
            }
        }
        if !self.at_word_boundary(end) {
            return None;
        }
        let duration = temporal::parse_duration(&self.text[self.pos..end])?;
        self.pos = end;
        Some(duration)
    }

    fn digit_run(&mut self) -> (usize, usize) {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        (start, self.pos)
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        let negative = self.peek() == Some(b'-');
        if negative {
            self.pos += 1;
        }
        let (int_start, int_end) = self.digit_run();
        if int_start == int_end {
            return Err(ParseError::new(start, ParseErrorKind::InvalidNumber));
        }

        let mut frac_range = None;
        if self.peek() == Some(b'.') {
            self.pos += 1;
            let (frac_start, frac_end) = self.digit_run();
            if frac_start == frac_end {
                return Err(ParseError::new(start, ParseErrorKind::InvalidNumber));
            }
            frac_range = Some((frac_start, frac_end));
        }

        let mut exponent: Option<i32> = None;
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            let exp_negative = match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    false
                }
                Some(b'-') => {
                    self.pos += 1;
                    true
                }
                _ => false,
            };
            let (exp_start, exp_end) = self.digit_run();
            if exp_start == exp_end {
                return Err(ParseError::new(start, ParseErrorKind::InvalidNumber));
            }
            let magnitude: i32 = self.text[exp_start..exp_end]
                .parse()
                .map_err(|_| ParseError::new(start, ParseErrorKind::InvalidNumber))?;
            exponent = Some(if exp_negative { -magnitude } else { magnitude });
        }

        match self.peek() {
            Some(b'n') => {
                // A BigInt is a whole number; fraction and exponent parts
                // are incompatible with the suffix.
                if frac_range.is_some() || exponent.is_some() {
                    return Err(ParseError::new(start, ParseErrorKind::InvalidNumber));
                }
                self.pos += 1;
                Ok(Value::BigInt(BigInt::new(
                    negative,
                    &self.text[int_start..int_end],
                )))
            }
            Some(b'm') => {
                self.pos += 1;
                let mut digits = self.text[int_start..int_end].to_string();
                let mut decimal_exponent = exponent.unwrap_or(0);
                if let Some((frac_start, frac_end)) = frac_range {
                    digits.push_str(&self.text[frac_start..frac_end]);
                    let frac_len = i32::try_from(frac_end - frac_start)
                        .map_err(|_| ParseError::new(start, ParseErrorKind::InvalidNumber))?;
                    decimal_exponent = decimal_exponent
                        .checked_sub(frac_len)
                        .ok_or_else(|| ParseError::new(start, ParseErrorKind::InvalidNumber))?;
                }
                Ok(Value::Decimal128(Decimal128::new(
                    negative,
                    decimal_exponent,
                    &digits,
                )))
            }
            _ => {
                let number: f64 = self.text[start..self.pos]
                    .parse()
                    .map_err(|_| ParseError::new(start, ParseErrorKind::InvalidNumber))?;
                Ok(Value::Number(number))
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let quote = self.bytes[self.pos];
        self.pos += 1;
        let mut out = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(ParseError::new(start, ParseErrorKind::UnterminatedString)),
                Some(byte) if byte == quote => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                    run_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let escape_pos = self.pos - 1;
        let Some(byte) = self.peek() else {
            return Err(self.eof());
        };
        self.pos += 1;
        let replacement = match byte {
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'"' => '"',
            b'\'' => '\'',
            b'`' => '`',
            b'\\' => '\\',
            b'/' => '/',
            b'u' => {
                let unit = self.hex_code_unit(escape_pos)?;
                let scalar = if (0xD800..=0xDBFF).contains(&unit) {
                    // High surrogate; a low surrogate escape must follow.
                    if self.peek() != Some(b'\\') || self.bytes.get(self.pos + 1) != Some(&b'u') {
                        return Err(ParseError::new(
                            escape_pos,
                            ParseErrorKind::InvalidUnicodeEscape,
                        ));
                    }
                    self.pos += 2;
                    let low = self.hex_code_unit(escape_pos)?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(ParseError::new(
                            escape_pos,
                            ParseErrorKind::InvalidUnicodeEscape,
                        ));
                    }
                    0x10000 + (u32::from(unit - 0xD800) << 10) + u32::from(low - 0xDC00)
                } else if (0xDC00..=0xDFFF).contains(&unit) {
                    return Err(ParseError::new(
                        escape_pos,
                        ParseErrorKind::InvalidUnicodeEscape,
                    ));
                } else {
                    u32::from(unit)
                };
                char::from_u32(scalar).ok_or_else(|| {
                    ParseError::new(escape_pos, ParseErrorKind::InvalidUnicodeEscape)
                })?
            }
            _ => return Err(ParseError::new(escape_pos, ParseErrorKind::InvalidEscape)),
        };
        out.push(replacement);
        Ok(())
    }

    fn hex_code_unit(&mut self, escape_pos: usize) -> Result<u16, ParseError> {
        let digits = self
            .bytes
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| ParseError::new(escape_pos, ParseErrorKind::InvalidUnicodeEscape))?;
        let mut unit: u16 = 0;
        for byte in digits {
            let nibble = match byte {
                b'0'..=b'9' => byte - b'0',
                b'a'..=b'f' => byte - b'a' + 10,
                b'A'..=b'F' => byte - b'A' + 10,
                _ => {
                    return Err(ParseError::new(
                        escape_pos,
                        ParseErrorKind::InvalidUnicodeEscape,
                    ));
                }
            };
            unit = (unit << 4) | u16::from(nibble);
        }
        self.pos += 4;
        Ok(unit)
    }

    fn parse_member_key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            None => Err(self.eof()),
            Some(b'"' | b'\'' | b'`') => self.parse_string(),
            Some(byte) if is_identifier_start(byte) => {
                let start = self.pos;
                while self.peek().is_some_and(is_identifier_byte) {
                    self.pos += 1;
                }
                Ok(self.text[start..self.pos].to_string())
            }
            Some(byte) => Err(ParseError::new(
                self.pos,
                ParseErrorKind::UnexpectedCharacter(byte),
            )),
        }
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.pos += 1;
        let mut members = Vec::new();
        self.skip_trivia()?;
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Object(members));
        }
        loop {
            let key = self.parse_member_key()?;
            self.skip_trivia()?;
            match self.peek() {
                Some(b':') => self.pos += 1,
                Some(byte) => {
                    return Err(ParseError::new(
                        self.pos,
                        ParseErrorKind::UnexpectedCharacter(byte),
                    ));
                }
                None => return Err(self.eof()),
            }
            self.skip_trivia()?;
            let value = self.parse_value()?;
            members.push((key, value));
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia()?;
                    // Trailing comma before the closing brace.
                    if self.peek() == Some(b'}') {
                        self.pos += 1;
                        return Ok(Value::Object(members));
                    }
                }
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(members));
                }
                Some(byte) => {
                    return Err(ParseError::new(
                        self.pos,
                        ParseErrorKind::UnexpectedCharacter(byte),
                    ));
                }
                None => return Err(self.eof()),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.pos += 1;
        let mut items = Vec::new();
        self.skip_trivia()?;
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia()?;
                    if self.peek() == Some(b']') {
                        self.pos += 1;
                        return Ok(Value::Array(items));
                    }
                }
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(byte) => {
                    return Err(ParseError::new(
                        self.pos,
                        ParseErrorKind::UnexpectedCharacter(byte),
                    ));
                }
                None => return Err(self.eof()),
            }
        }
    }
}
