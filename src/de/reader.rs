use crate::de::{ParseAsync, MAX_ARRAY_LEN, MAX_BULK_LEN, MAX_DEPTH};
use crate::{Error, RespValue, Result};
use async_trait::async_trait;
use log::trace;
use std::collections::VecDeque;
use std::str::from_utf8;
use tokio::io::{AsyncRead, AsyncReadExt};

/// How many bytes each refill pulls from the underlying reader.
const CHUNK: usize = 128;

/// A decoding cursor over an async byte stream.
///
/// The parser keeps a small staging buffer in front of the reader and pulls
/// more bytes only when the value in progress needs them, so one parser can
/// drain any number of back-to-back values from the same stream. It never
/// closes the reader; pass `&mut reader` to keep ownership at the call site.
///
/// Decoding a stream is inherently sequential: one `ReaderParser` per
/// stream, one [`parse`](ReaderParser::parse) call at a time.
///
/// # Examples
///
/// ```rust
/// use respwire::{ReaderParser, RespValue};
///
/// let wire = b"+OK\r\n:42\r\n";
///
/// tokio_test::block_on(async {
///     let mut parser = ReaderParser::from_reader(&wire[..]);
///
///     let first = parser.parse().await.unwrap();
///     let second = parser.parse().await.unwrap();
///
///     assert_eq!(first, RespValue::SimpleString("OK".to_owned()));
///     assert_eq!(second, RespValue::Integer(42));
/// });
/// ```
pub struct ReaderParser<R: AsyncRead + Unpin + Send> {
    reader: R,
    buf: VecDeque<u8>,
    depth: usize,
}

impl<R: AsyncRead + Unpin + Send> ReaderParser<R> {
    /// Wrap a reader in a parsing cursor.
    pub fn from_reader(reader: R) -> Self {
        ReaderParser {
            reader,
            buf: VecDeque::new(),
            depth: 0,
        }
    }

    /// True when no bytes are staged past the last parsed value.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Decode the next value off the stream.
    ///
    /// Each call consumes exactly one value. [`Error::Eof`] before the
    /// first byte means the stream ended cleanly between values; any
    /// failure mid-value leaves the stream desynchronized.
    pub async fn parse(&mut self) -> Result<RespValue> {
        self.parse_any().await
    }

    async fn fill_buf(&mut self) -> Result<()> {
        let mut tmp = [0; CHUNK];
        let n = match self.reader.read(&mut tmp).await {
            Ok(n) => n,
            Err(_) => return Err(Error::ReaderFailed),
        };
        if n == 0 {
            return Err(Error::Eof);
        }

        trace!("staged {} bytes from the reader", n);
        self.buf.extend(&tmp[..n]);

        Ok(())
    }

    async fn next_byte(&mut self) -> Result<u8> {
        loop {
            if let Some(byte) = self.buf.pop_front() {
                return Ok(byte);
            }
            self.fill_buf().await?;
        }
    }

    /// Consume through the next `\n`, returning the line with its
    /// terminator (`\r\n` or a bare `\n`) stripped.
    async fn read_line(&mut self) -> Result<Vec<u8>> {
        loop {
            if let Some(end) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.buf.drain(..=end).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(line);
            }
            self.fill_buf().await?;
        }
    }

    /// Consume `n` payload bytes plus the two terminator bytes, returning
    /// the payload.
    async fn read_fixed(&mut self, n: usize) -> Result<Vec<u8>> {
        while self.buf.len() < n + 2 {
            self.fill_buf().await?;
        }

        let payload: Vec<u8> = self.buf.drain(..n).collect();
        self.buf.drain(..2);

        Ok(payload)
    }

    /// Parse a signed length line. `-1` is the null sentinel; anything else
    /// outside `0..=max` is rejected.
    async fn read_length(&mut self, max: i64) -> Result<Option<usize>> {
        let line = self.read_line().await?;
        let len: i64 = from_utf8(&line)
            .map_err(|_| Error::InvalidLength)?
            .parse()
            .map_err(|_| Error::InvalidLength)?;

        match len {
            -1 => Ok(None),
            n if (0..=max).contains(&n) => Ok(Some(n as usize)),
            _ => Err(Error::InvalidLength),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ParseAsync for ReaderParser<R> {
    async fn parse_any(&mut self) -> Result<RespValue> {
        match self.next_byte().await? {
            b'+' => self.parse_simple_string().await,
            b'-' => self.parse_error().await,
            b':' => self.parse_integer().await,
            b'$' => self.parse_bulk_string().await,
            b'*' => self.parse_array().await,
            _ => Err(Error::InvalidPrefix),
        }
    }

    async fn parse_simple_string(&mut self) -> Result<RespValue> {
        let line = self.read_line().await?;

        Ok(RespValue::SimpleString(from_utf8(&line)?.to_owned()))
    }

    async fn parse_error(&mut self) -> Result<RespValue> {
        let line = self.read_line().await?;

        Ok(RespValue::Error(from_utf8(&line)?.to_owned()))
    }

    async fn parse_integer(&mut self) -> Result<RespValue> {
        let line = self.read_line().await?;
        let int = from_utf8(&line)
            .map_err(|_| Error::InvalidInteger)?
            .parse()
            .map_err(|_| Error::InvalidInteger)?;

        Ok(RespValue::Integer(int))
    }

    async fn parse_bulk_string(&mut self) -> Result<RespValue> {
        match self.read_length(MAX_BULK_LEN).await? {
            None => Ok(RespValue::Null),
            Some(len) => {
                let payload = self.read_fixed(len).await?;

                Ok(RespValue::BulkString(from_utf8(&payload)?.to_owned()))
            }
        }
    }

    async fn parse_array(&mut self) -> Result<RespValue> {
        let Some(count) = self.read_length(MAX_ARRAY_LEN).await? else {
            return Ok(RespValue::NullArray);
        };

        if self.depth == MAX_DEPTH {
            return Err(Error::NestingTooDeep);
        }
        self.depth += 1;

        let mut out: Vec<RespValue> = Vec::new();

        for _ in 0..count {
            let next = self.parse_any().await?;
            out.push(next);
        }

        self.depth -= 1;

        Ok(RespValue::Array(out))
    }
}

#[cfg(test)]
mod tests {
    use super::ReaderParser;
    use crate::{Error, RespValue};
    use std::io;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_parse_simple_string() {
        let res = RespValue::from_reader(&b"+hello world\r\n"[..]).await.unwrap();

        assert_eq!(res, RespValue::SimpleString("hello world".to_owned()));
    }

    #[tokio::test]
    async fn test_parse_error() {
        let res = RespValue::from_reader(&b"-Error message\r\n"[..]).await.unwrap();

        assert_eq!(res, RespValue::Error("Error message".to_owned()));
    }

    #[tokio::test]
    async fn test_parse_integer() {
        let res = RespValue::from_reader(&b":123\r\n"[..]).await.unwrap();

        assert_eq!(res, RespValue::Integer(123));
    }

    #[tokio::test]
    async fn test_parse_bad_integer() {
        let res = RespValue::from_reader(&b":10abc\r\n"[..]).await.err().unwrap();

        assert_eq!(res, Error::InvalidInteger);
    }

    #[tokio::test]
    async fn test_parse_bulk_string() {
        let res = RespValue::from_reader(&b"$8\r\nhello ak\r\n"[..]).await.unwrap();

        assert_eq!(res, RespValue::BulkString("hello ak".to_owned()));
    }

    #[tokio::test]
    async fn test_parse_null() {
        let res = RespValue::from_reader(&b"$-1\r\n"[..]).await.unwrap();

        assert_eq!(res, RespValue::Null);
    }

    #[tokio::test]
    async fn test_parse_nested_array() {
        let wire = b"*2\r\n*2\r\n+hello\r\n+world\r\n:10\r\n";
        let res = RespValue::from_reader(&wire[..]).await.unwrap();
        let expected = RespValue::Array(vec![
            RespValue::Array(vec![
                RespValue::SimpleString("hello".to_owned()),
                RespValue::SimpleString("world".to_owned()),
            ]),
            RespValue::Integer(10),
        ]);

        assert_eq!(res, expected);
    }

    #[tokio::test]
    async fn test_parse_null_array() {
        let res = RespValue::from_reader(&b"*-1\r\n"[..]).await.unwrap();

        assert_eq!(res, RespValue::NullArray);
    }

    #[tokio::test]
    async fn test_parse_invalid_prefix() {
        let res = RespValue::from_reader(&b"bad"[..]).await.err().unwrap();

        assert_eq!(res, Error::InvalidPrefix);
    }

    #[tokio::test]
    async fn test_parse_truncated_bulk_string() {
        let res = RespValue::from_reader(&b"$10\r\nhello"[..]).await.err().unwrap();

        assert_eq!(res, Error::Eof);
        assert!(res.is_io());
    }

    #[tokio::test]
    async fn test_parse_empty_stream() {
        let res = RespValue::from_reader(&b""[..]).await.err().unwrap();

        assert_eq!(res, Error::Eof);
        assert!(res.is_io());
    }

    #[tokio::test]
    async fn test_reader_failure_mid_value() {
        let reader = Builder::new()
            .read(b"$8\r\nhel")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();

        let res = RespValue::from_reader(reader).await.err().unwrap();

        assert_eq!(res, Error::ReaderFailed);
        assert!(res.is_io());
    }

    #[tokio::test]
    async fn test_parse_bulk_string_across_refills() {
        // payload longer than one refill chunk
        let payload = "a".repeat(300);
        let wire = format!("${}\r\n{}\r\n", payload.len(), payload);

        let res = RespValue::from_reader(wire.as_bytes()).await.unwrap();

        assert_eq!(res, RespValue::BulkString(payload));
    }

    #[tokio::test]
    async fn test_pipelined_values() {
        let wire = b"+OK\r\n:42\r\n$4\r\nping\r\n";
        let mut parser = ReaderParser::from_reader(&wire[..]);

        assert_eq!(
            parser.parse().await.unwrap(),
            RespValue::SimpleString("OK".to_owned())
        );
        assert_eq!(parser.parse().await.unwrap(), RespValue::Integer(42));
        assert_eq!(
            parser.parse().await.unwrap(),
            RespValue::BulkString("ping".to_owned())
        );

        // the stream is drained; the next read is a clean end-of-stream
        assert!(parser.is_empty());
        assert_eq!(parser.parse().await.err().unwrap(), Error::Eof);
    }

    #[tokio::test]
    async fn test_parser_borrows_reader() {
        let mut reader = &b"+first\r\n"[..];

        let res = RespValue::from_reader(&mut reader).await.unwrap();

        assert_eq!(res, RespValue::SimpleString("first".to_owned()));
    }
}
