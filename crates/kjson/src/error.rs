use core::fmt;

/// An error produced while parsing kJSON text.
///
/// Carries the byte offset into the input at which parsing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    offset: usize,
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError { offset, kind }
    }

    /// Byte offset into the input where the error was detected.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// The reason a [`ParseError`] was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// Input ended while a value was still expected or incomplete.
    UnexpectedEof,
    /// A byte that cannot start or continue the expected construct.
    UnexpectedCharacter(u8),
    /// A string literal ran to the end of input without its closing quote.
    UnterminatedString,
    /// A `/* */` comment ran to the end of input.
    UnterminatedComment,
    /// An unknown `\x` escape inside a string literal.
    InvalidEscape,
    /// A `\uXXXX` escape with bad hex digits or an unpaired surrogate.
    InvalidUnicodeEscape,
    /// A malformed numeric literal, including `n`-suffixed fractions.
    InvalidNumber,
    /// Input that is not valid UTF-8.
    InvalidUtf8,
    /// Non-whitespace content after the single top-level value.
    TrailingData,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedEof => f.write_str("unexpected end of input"),
            ParseErrorKind::UnexpectedCharacter(byte) => {
                if byte.is_ascii_graphic() {
                    write!(f, "unexpected character `{}`", *byte as char)
                } else {
                    write!(f, "unexpected byte 0x{byte:02x}")
                }
            }
            ParseErrorKind::UnterminatedString => f.write_str("unterminated string"),
            ParseErrorKind::UnterminatedComment => f.write_str("unterminated comment"),
            ParseErrorKind::InvalidEscape => f.write_str("invalid escape sequence"),
            ParseErrorKind::InvalidUnicodeEscape => f.write_str("invalid unicode escape"),
            ParseErrorKind::InvalidNumber => f.write_str("invalid number literal"),
            ParseErrorKind::InvalidUtf8 => f.write_str("input is not valid UTF-8"),
            ParseErrorKind::TrailingData => {
                f.write_str("trailing data after the top-level value")
            }
        }
    }
}

/// An error produced while decoding the kJSONB binary format.
///
/// Decoding always fails closed: corrupt input is reported, never silently
/// replaced with a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// A read would run past the end of the supplied buffer.
    Truncated,
    /// A type tag byte that is not part of the format.
    InvalidTag(u8),
    /// A varint that does not fit into 64 bits.
    MalformedVarint,
    /// Payload bytes that violate the tagged type's invariant, such as a
    /// non-UTF-8 string or a digit string with non-digit bytes.
    InvalidPayload,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated => f.write_str("binary input is truncated"),
            DecodeError::InvalidTag(tag) => write!(f, "invalid type tag 0x{tag:02x}"),
            DecodeError::MalformedVarint => f.write_str("varint does not fit into 64 bits"),
            DecodeError::InvalidPayload => f.write_str("payload violates type invariant"),
        }
    }
}

impl std::error::Error for DecodeError {}
