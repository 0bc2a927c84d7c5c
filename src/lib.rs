//! # Respwire
//!
//! This crate implements the Redis Serialization Protocol (RESP)
//!
//! The [`RespValue`] enum provides the basic types for Redis serialized
//! messages. Values serialize to their exact wire encoding through
//! [`SerializeResp`] (or `Display`), and can be parsed back from `&[u8]`,
//! `&str` and async readers.
//!
//! # Examples
//!
//! ## Printing a `RespValue` as wire bytes
//!
//! ```rust
//! use respwire::RespValue;
//!
//! let hello = RespValue::SimpleString("hello world".to_owned());
//! assert_eq!(format!("{}", hello), "+hello world\r\n".to_string());
//! ```
//!
//! ## Parsing a `RespValue` from a `&[u8]`, `&str` and a reader
//!
//! ```rust
//! use respwire::RespValue;
//!
//! let bytes = b"$11\r\nhello world\r\n";
//! let res = RespValue::from_bytes(bytes).unwrap();
//!
//! assert_eq!(res, RespValue::BulkString("hello world".to_owned()));
//!
//! let string = "$11\r\nhello world\r\n";
//! let res = RespValue::from_str(string).unwrap();
//!
//! assert_eq!(res, RespValue::BulkString("hello world".to_owned()));
//!
//! let res = tokio_test::block_on(async {
//!     RespValue::from_reader(&b"$11\r\nhello world\r\n"[..]).await
//! })
//! .unwrap();
//!
//! assert_eq!(res, RespValue::BulkString("hello world".to_owned()));
//! ```

#![warn(missing_docs)]

use std::fmt;

mod de;
mod error;
mod ser;

pub use de::ReaderParser;
pub use error::{Error, Result};
pub use ser::SerializeResp;

/// Representation of a Redis serialized value
///
/// see [https://redis.io/docs/reference/protocol-spec](https://redis.io/docs/reference/protocol-spec)
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// A simple string has the format `+hello\r\n`; the text never carries
    /// CR or LF
    SimpleString(String),
    /// An error reply; always serializes as the fixed line
    /// `-Error message\r\n` no matter what the payload says
    Error(String),
    /// An integer has the format `:10\r\n`
    Integer(i64),
    /// A bulk string has the format `$5\r\nhello\r\n`, framed by byte count
    BulkString(String),
    /// An array has the format `*2\r\n+hello\r\n+world\r\n`
    Array(Vec<RespValue>),
    /// The null bulk string is represented by the literal `$-1\r\n`
    Null,
    /// The null array is represented by the literal `*-1\r\n`
    NullArray,
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialize())
    }
}
