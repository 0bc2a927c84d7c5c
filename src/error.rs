use thiserror::Error;

/// Alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error decoding a RESP value.
///
/// Failures come in two categories the caller may need to tell apart:
/// transport failures (the stream errored or ran out mid-value) and protocol
/// failures (the bytes arrived but do not form a valid value). Use
/// [`Error::is_io`] to distinguish them. Encoding has no error type at all;
/// it is total over every representable value.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// The underlying reader returned an error.
    #[error("reader failed")]
    ReaderFailed,
    /// The stream ended before a complete value was read.
    #[error("unexpected end of stream")]
    Eof,
    /// The first byte of a value was not one of `+ - : $ *`.
    #[error("invalid type byte")]
    InvalidPrefix,
    /// An integer line did not hold a signed base-10 number.
    #[error("invalid integer")]
    InvalidInteger,
    /// A bulk string length or array count was malformed or out of range.
    #[error("invalid length")]
    InvalidLength,
    /// Arrays were nested beyond the supported depth.
    #[error("arrays nested too deeply")]
    NestingTooDeep,
    /// Input continued past the end of a complete value.
    #[error("found trailing bytes")]
    TrailingBytes,
    /// A textual payload was not valid UTF-8.
    #[error("couldn't parse bytes to string")]
    Utf8(#[from] core::str::Utf8Error),
}

impl Error {
    /// True when the failure came from the transport rather than the
    /// protocol.
    ///
    /// Either way the stream position is indeterminate afterwards; a caller
    /// wanting to keep the connection must resynchronize out of band.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::ReaderFailed | Error::Eof)
    }
}
