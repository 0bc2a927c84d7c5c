use crate::RespValue;

/// Serialization of a [`RespValue`] into its exact wire encoding.
pub trait SerializeResp {
    /// Produce the wire bytes for this value.
    ///
    /// Serialization is total: every representable value has exactly one
    /// encoding and nothing here can fail.
    fn serialize(&self) -> String;
}

impl RespValue {
    fn serialize_simple_string(s: &str) -> String {
        format!("+{s}\r\n")
    }

    // Every error reply goes out as the same generic line; the payload is
    // not written. Wire-visible behavior, keep it stable.
    fn serialize_error() -> String {
        "-Error message\r\n".to_owned()
    }

    fn serialize_integer(int: i64) -> String {
        format!(":{int}\r\n")
    }

    fn serialize_bulk_string(s: &str) -> String {
        // len() counts bytes, which is what frames the payload on the wire
        format!("${}\r\n{s}\r\n", s.len())
    }

    fn serialize_array(items: &[RespValue]) -> String {
        let mut out = format!("*{}\r\n", items.len());

        for item in items {
            out.push_str(&item.serialize());
        }

        out
    }
}

impl SerializeResp for RespValue {
    fn serialize(&self) -> String {
        match self {
            RespValue::SimpleString(s) => Self::serialize_simple_string(s),
            RespValue::Error(_) => Self::serialize_error(),
            RespValue::Integer(int) => Self::serialize_integer(*int),
            RespValue::BulkString(s) => Self::serialize_bulk_string(s),
            RespValue::Array(items) => Self::serialize_array(items),
            RespValue::Null => "$-1\r\n".to_owned(),
            RespValue::NullArray => "*-1\r\n".to_owned(),
        }
    }
}
