//! Worker output capture
//!
//! Each stage invocation owns two [`OutputBuffer`]s, one per stream. They are
//! plain values local to that call and never shared between invocations.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

const CHUNK_SIZE: usize = 8 * 1024;

/// Which worker stream a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Raw bytes captured from one stream
///
/// Bytes are kept undecoded until the stage ends so a multi-byte character
/// split across two reads is not mangled.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the captured bytes, replacing invalid UTF-8
    pub fn into_text(self) -> String {
        match String::from_utf8(self.bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

/// Reads `reader` until EOF, appending every chunk to `buffer` as it arrives
///
/// Data already appended stays in `buffer` if this future is dropped midway.
pub(crate) async fn drain<R>(
    reader: Option<R>,
    buffer: &mut OutputBuffer,
    stage: &str,
    stream: Stream,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(());
    };

    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }

        buffer.push(&chunk[..read]);
        debug!(
            stage,
            stream = stream.as_str(),
            "{}",
            String::from_utf8_lossy(&chunk[..read]).trim_end()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_accumulates_chunks() {
        let mut buffer = OutputBuffer::new();
        assert!(buffer.is_empty());

        buffer.push(b"12 reviews ");
        buffer.push(b"saved");

        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer.into_text(), "12 reviews saved");
    }

    #[test]
    fn test_split_multibyte_character_survives() {
        let text = "yorumlar çekildi";
        let bytes = text.as_bytes();
        let split = text.find('ç').unwrap() + 1;

        let mut buffer = OutputBuffer::new();
        buffer.push(&bytes[..split]);
        buffer.push(&bytes[split..]);

        assert_eq!(buffer.into_text(), text);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut buffer = OutputBuffer::new();
        buffer.push(&[b'o', b'k', 0xff]);
        assert_eq!(buffer.into_text(), "ok\u{fffd}");
    }

    #[tokio::test]
    async fn test_drain_reads_to_eof() {
        let data: &[u8] = b"line one\nline two\n";
        let mut buffer = OutputBuffer::new();

        drain(Some(data), &mut buffer, "collect", Stream::Stdout)
            .await
            .unwrap();

        assert_eq!(buffer.into_text(), "line one\nline two\n");
    }

    #[tokio::test]
    async fn test_drain_without_pipe_is_noop() {
        let mut buffer = OutputBuffer::new();

        drain::<&[u8]>(None, &mut buffer, "index", Stream::Stderr)
            .await
            .unwrap();

        assert!(buffer.is_empty());
    }
}
