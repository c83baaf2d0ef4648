//! Newline-delimited JSON transport.
//!
//! One JSON-RPC message per line, UTF-8, no embedded newlines. The server
//! reads from stdin and replies on stdout, so logs must go to stderr.
//! [`Transport`] is generic over the byte streams so the same framing can
//! be driven from in-memory buffers.

use std::io;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::protocol::{JsonRpcError, JsonRpcResponse};

/// Line-framed message channel.
pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

/// The transport the server binary uses.
pub type StdioTransport = Transport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Attaches to the process stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps a reader and a writer.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Gives the writer back, e.g. to inspect what was sent.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Next line without its terminator, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Propagates read failures, including invalid UTF-8.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Sends a success reply.
    ///
    /// # Errors
    ///
    /// Fails if serialisation or the write fails.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        self.write_json(response).await
    }

    /// Sends an error reply.
    ///
    /// # Errors
    ///
    /// Fails if serialisation or the write fails.
    pub async fn write_error(&mut self, error: &JsonRpcError) -> io::Result<()> {
        self.write_json(error).await
    }

    async fn write_json<T: Serialize>(&mut self, message: &T) -> io::Result<()> {
        let line = serde_json::to_string(message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        // serde_json escapes newlines inside strings, so one message is one line
        debug_assert!(!line.contains('\n'));
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}
