use crate::de::{Parse, MAX_ARRAY_LEN, MAX_BULK_LEN, MAX_DEPTH};
use crate::{Error, RespValue, Result};
use bstr::ByteSlice;
use std::str::from_utf8;

/// A zero-copy parsing cursor over an in-memory byte slice.
pub struct ByteParser<'de> {
    input: &'de [u8],
    depth: usize,
}

impl<'de> ByteParser<'de> {
    pub fn from_str(input: &'de str) -> Self {
        ByteParser {
            input: input.as_bytes(),
            depth: 0,
        }
    }

    pub fn from_bytes(input: &'de [u8]) -> Self {
        ByteParser { input, depth: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = self.input.first().copied().ok_or(Error::Eof)?;
        self.input = &self.input[1..];
        Ok(byte)
    }

    /// Consume through the next `\n`, returning the line with its
    /// terminator (`\r\n` or a bare `\n`) stripped.
    fn read_line(&mut self) -> Result<&'de [u8]> {
        let end = self.input.find_byte(b'\n').ok_or(Error::Eof)?;
        let line = &self.input[..end];
        self.input = &self.input[end + 1..];
        Ok(line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// Consume `n` payload bytes plus the two terminator bytes, returning
    /// the payload.
    fn read_fixed(&mut self, n: usize) -> Result<&'de [u8]> {
        if self.input.len() < n + 2 {
            return Err(Error::Eof);
        }
        let payload = &self.input[..n];
        self.input = &self.input[n + 2..];
        Ok(payload)
    }

    /// Parse a signed length line. `-1` is the null sentinel; anything else
    /// outside `0..=max` is rejected.
    fn read_length(&mut self, max: i64) -> Result<Option<usize>> {
        let line = self.read_line()?;
        let len: i64 = from_utf8(line)
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

impl<'de> Parse for ByteParser<'de> {
    fn parse_any(&mut self) -> Result<RespValue> {
        match self.next_byte()? {
            b'+' => self.parse_simple_string(),
            b'-' => self.parse_error(),
            b':' => self.parse_integer(),
            b'$' => self.parse_bulk_string(),
            b'*' => self.parse_array(),
            _ => Err(Error::InvalidPrefix),
        }
    }

    fn parse_simple_string(&mut self) -> Result<RespValue> {
        let line = self.read_line()?;

        Ok(RespValue::SimpleString(from_utf8(line)?.to_owned()))
    }

    fn parse_error(&mut self) -> Result<RespValue> {
        let line = self.read_line()?;

        Ok(RespValue::Error(from_utf8(line)?.to_owned()))
    }

    fn parse_integer(&mut self) -> Result<RespValue> {
        let line = self.read_line()?;
        let int = from_utf8(line)
            .map_err(|_| Error::InvalidInteger)?
            .parse()
            .map_err(|_| Error::InvalidInteger)?;

        Ok(RespValue::Integer(int))
    }

    fn parse_bulk_string(&mut self) -> Result<RespValue> {
        match self.read_length(MAX_BULK_LEN)? {
            None => Ok(RespValue::Null),
            Some(len) => {
                let payload = self.read_fixed(len)?;

                Ok(RespValue::BulkString(from_utf8(payload)?.to_owned()))
            }
        }
    }

    fn parse_array(&mut self) -> Result<RespValue> {
        let Some(count) = self.read_length(MAX_ARRAY_LEN)? else {
            return Ok(RespValue::NullArray);
        };

        if self.depth == MAX_DEPTH {
            return Err(Error::NestingTooDeep);
        }
        self.depth += 1;

        let mut out: Vec<RespValue> = Vec::new();

        for _ in 0..count {
            let next = self.parse_any()?;
            out.push(next);
        }

        self.depth -= 1;

        Ok(RespValue::Array(out))
    }
}
