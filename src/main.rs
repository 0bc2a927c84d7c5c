use log::debug;
use respwire::{ReaderParser, RespValue, Result, SerializeResp};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let wire = b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n";

    let value = RespValue::from_reader(&wire[..]).await?;
    debug!("decoded {:?}", value);

    assert_eq!(value.serialize().as_bytes(), &wire[..]);

    // drain a pipelined stream one value at a time
    let mut parser = ReaderParser::from_reader(&b"+OK\r\n:42\r\n$4\r\nping\r\n"[..]);
    while let Ok(value) = parser.parse().await {
        println!("{:?}", value);
    }

    Ok(())
}
