//! Byte stream plumbing for the store contract.

use std::io::Cursor;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

/// An owned readable stream of file content. Dropping it releases the underlying handle.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

/// Wrap in-memory bytes as a stream.
pub fn from_bytes(data: impl Into<Bytes>) -> ByteStream {
    Box::new(Cursor::new(data.into()))
}

/// Drain a stream into memory, consuming it.
pub async fn read_to_bytes(mut stream: ByteStream) -> std::io::Result<Bytes> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(Bytes::from(buf))
}
