//! kJSON: a JSON5 superset with first-class extended scalar types.
//!
//! On top of the JSON value set, kJSON text carries arbitrary-precision
//! integers (`123n`), arbitrary-precision decimals (`99.99m`), unquoted
//! UUIDs, ISO-8601 instants, and ISO-8601 durations as literals, plus the
//! JSON5 conveniences: comments, trailing commas, unquoted keys, and
//! single/backtick-quoted strings. Values also round-trip through kJSONB,
//! a compact type-tagged binary encoding suitable for storage, and carry
//! a total order and a structural containment relation suitable for
//! indexing.
//!
//! ```
//! use kjson::{parse, stringify, WriteOptions};
//!
//! let value = parse(
//!     "{amount: 99.99m, id: 550e8400-e29b-41d4-a716-446655440000}",
//! )?;
//! assert_eq!(
//!     stringify(&value, &WriteOptions::default()),
//!     "{amount:99.99m,id:550e8400-e29b-41d4-a716-446655440000}",
//! );
//!
//! let bytes = kjson::encode(&value);
//! assert_eq!(kjson::decode(&bytes)?, value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Every operation is a pure, synchronous function of its inputs; there
//! is no shared state, so values and operations can be used freely across
//! threads.

mod binary;
mod cmp;
mod containment;
mod error;
mod parser;
mod stringify;
mod temporal;
mod value;

pub use binary::{decode, encode};
pub use cmp::{compare, equals};
pub use containment::{contained_by, contains, strip_nulls};
pub use error::{DecodeError, ParseError, ParseErrorKind};
pub use parser::{parse, parse_bytes};
pub use stringify::{stringify, WriteOptions};
pub use uuid::Uuid;
pub use value::{uuid_v4, uuid_v7, BigInt, Decimal128, Duration, Instant, Value};
