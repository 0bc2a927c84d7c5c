use crate::error::{Error, Result};
use crate::RespValue;
use async_trait::async_trait;
use log::debug;
use tokio::io::AsyncRead;

mod byte;
mod reader;

use byte::ByteParser;
pub use reader::ReaderParser;

/// How many levels of array nesting the decoder will follow.
const MAX_DEPTH: usize = 64;

/// Largest bulk string length accepted, 512 MiB.
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Largest array element count accepted.
const MAX_ARRAY_LEN: i64 = 1024 * 1024;

impl RespValue {
    /// Parse one `RespValue` out of a string
    ///
    /// The input must hold exactly one value; anything left over is
    /// [`Error::TrailingBytes`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use respwire::RespValue;
    ///
    /// let input = "*2\r\n+hello\r\n+world\r\n";
    /// let resp = RespValue::from_str(input).unwrap();
    /// let expected = RespValue::Array(vec![
    ///     RespValue::SimpleString("hello".to_owned()),
    ///     RespValue::SimpleString("world".to_owned()),
    /// ]);
    ///
    /// assert_eq!(resp, expected);
    /// ```
    pub fn from_str(s: &str) -> Result<Self> {
        let mut parser = ByteParser::from_str(s);

        let res = parser.parse_any()?;

        if parser.is_empty() {
            Ok(res)
        } else {
            Err(Error::TrailingBytes)
        }
    }

    /// Parse one `RespValue` out of a byte slice
    ///
    /// # Examples
    ///
    /// ```rust
    /// use respwire::RespValue;
    ///
    /// let input = b":123\r\n";
    /// let resp = RespValue::from_bytes(input).unwrap();
    ///
    /// assert_eq!(resp, RespValue::Integer(123));
    /// ```
    pub fn from_bytes(b: &[u8]) -> Result<Self> {
        let mut parser = ByteParser::from_bytes(b);

        let res = parser.parse_any()?;

        if parser.is_empty() {
            Ok(res)
        } else {
            Err(Error::TrailingBytes)
        }
    }

    /// Parse consecutive `RespValue`s out of a string until it is exhausted
    ///
    /// An empty input is [`Error::Eof`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use respwire::RespValue;
    ///
    /// let input = "+hello\r\n+world\r\n";
    /// let resp = RespValue::vec_from_str(input).unwrap();
    /// let expected = vec![
    ///     RespValue::SimpleString("hello".to_owned()),
    ///     RespValue::SimpleString("world".to_owned()),
    /// ];
    ///
    /// assert_eq!(resp, expected);
    /// ```
    pub fn vec_from_str(s: &str) -> Result<Vec<Self>> {
        let mut out = Vec::new();

        let mut parser = ByteParser::from_str(s);

        while !parser.is_empty() {
            let res = parser.parse_any()?;

            out.push(res);
        }

        if out.is_empty() {
            return Err(Error::Eof);
        }

        debug!("parsed {} values", out.len());

        Ok(out)
    }

    /// Decode one `RespValue` off an async reader
    ///
    /// The reader is only read, never closed; pass `&mut reader` to keep
    /// ownership at the call site. Bytes staged past the end of the value
    /// are [`Error::TrailingBytes`]; to drain a stream of back-to-back
    /// values, use a [`ReaderParser`] instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use respwire::RespValue;
    ///
    /// let resp = tokio_test::block_on(async {
    ///     RespValue::from_reader(&b"$4\r\nping\r\n"[..]).await
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(resp, RespValue::BulkString("ping".to_owned()));
    /// ```
    pub async fn from_reader(reader: impl AsyncRead + Unpin + Send) -> Result<Self> {
        let mut parser = ReaderParser::from_reader(reader);

        let res = parser.parse().await?;

        if parser.is_empty() {
            Ok(res)
        } else {
            Err(Error::TrailingBytes)
        }
    }
}

/// Decoding methods for the in-memory parser, one per type byte.
///
/// `parse_any` consumes the type byte and dispatches; the per-kind methods
/// expect it already consumed.
trait Parse {
    fn parse_any(&mut self) -> Result<RespValue>;
    fn parse_simple_string(&mut self) -> Result<RespValue>;
    fn parse_error(&mut self) -> Result<RespValue>;
    fn parse_integer(&mut self) -> Result<RespValue>;
    fn parse_bulk_string(&mut self) -> Result<RespValue>;
    fn parse_array(&mut self) -> Result<RespValue>;
}

/// The same surface for parsers that pull from an async stream.
#[async_trait]
trait ParseAsync {
    async fn parse_any(&mut self) -> Result<RespValue>;
    async fn parse_simple_string(&mut self) -> Result<RespValue>;
    async fn parse_error(&mut self) -> Result<RespValue>;
    async fn parse_integer(&mut self) -> Result<RespValue>;
    async fn parse_bulk_string(&mut self) -> Result<RespValue>;
    async fn parse_array(&mut self) -> Result<RespValue>;
}

#[cfg(test)]
mod tests {
    use crate::{Error, RespValue, SerializeResp};

    fn sample_values() -> Vec<RespValue> {
        vec![
            RespValue::SimpleString("OK".to_owned()),
            // the one error payload that survives the fixed encoding
            RespValue::Error("Error message".to_owned()),
            RespValue::Integer(123),
            RespValue::Integer(-4096),
            RespValue::BulkString("hello ak".to_owned()),
            RespValue::BulkString(String::new()),
            RespValue::Null,
            RespValue::NullArray,
            RespValue::Array(Vec::new()),
            RespValue::Array(vec![
                RespValue::BulkString("ping".to_owned()),
                RespValue::Integer(7),
                RespValue::Array(vec![RespValue::SimpleString("nested".to_owned())]),
                RespValue::Null,
            ]),
        ]
    }

    #[test]
    fn test_round_trip() {
        for value in sample_values() {
            let wire = value.serialize();
            assert_eq!(RespValue::from_str(&wire).unwrap(), value);
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_reader() {
        for value in sample_values() {
            let wire = value.serialize();
            let res = RespValue::from_reader(wire.as_bytes()).await.unwrap();
            assert_eq!(res, value);
        }
    }

    #[test]
    fn test_from_str_rejects_trailing_input() {
        let res = RespValue::from_str("+OK\r\n+OK\r\n").err().unwrap();

        assert_eq!(res, Error::TrailingBytes);
    }

    #[tokio::test]
    async fn test_from_reader_rejects_trailing_input() {
        let res = RespValue::from_reader(&b"+OK\r\n:10\r\n"[..])
            .await
            .err()
            .unwrap();

        assert_eq!(res, Error::TrailingBytes);
    }

    #[test]
    fn test_vec_from_str() {
        let input = "*1\r\n$4\r\nping\r\n+OK\r\n:10\r\n";
        let res = RespValue::vec_from_str(input).unwrap();
        let expected = vec![
            RespValue::Array(vec![RespValue::BulkString("ping".to_owned())]),
            RespValue::SimpleString("OK".to_owned()),
            RespValue::Integer(10),
        ];

        assert_eq!(res, expected);
    }

    #[test]
    fn test_vec_from_str_empty_input() {
        let res = RespValue::vec_from_str("").err().unwrap();

        assert_eq!(res, Error::Eof);
        assert!(res.is_io());
    }
}
