//! IRC transport layer for async I/O.
//!
//! A [`Transport`] owns one TCP or client-TLS socket and runs two
//! independent flows over it:
//!
//! - the receive flow reassembles CRLF lines and pushes them, in order,
//!   into an [`IncomingLines`] queue;
//! - the send flow drains an [`OutgoingLines`] queue fed by any number of
//!   [`LineSender`] handles and writes each line with its terminator.
//!
//! Either flow failing ends both. Cancelling the shutdown token makes the
//! send flow write every line already queued, flush, and close the write
//! side, so a final `QUIT` reaches the server.
//!
//! # Usage
//!
//! ```ignore
//! use slirc_proto::transport::{self, Transport};
//! use tokio_util::sync::CancellationToken;
//!
//! let (sender, outgoing) = transport::outbound();
//! let shutdown = CancellationToken::new();
//! let transport = Transport::connect("irc.libera.chat", 6697, true).await?;
//! let (mut incoming, task) = transport.spawn(outgoing, shutdown.clone());
//!
//! sender.send("NICK slircbot")?;
//! while let Some(line) = incoming.recv().await {
//!     println!("<- {line}");
//! }
//! let result = task.await?;
//! ```
//!
//! No certificate validation is performed for TLS connections.

mod error;
mod tls;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_rustls::client::TlsStream as ClientTlsStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::encode;
use crate::error::ProtocolError;
use crate::line::LineCodec;

pub use self::error::TransportError;

/// Create the outbound queue: a cloneable sender and the receiving end the
/// transport drains.
pub fn outbound() -> (LineSender, OutgoingLines) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LineSender { tx }, OutgoingLines { rx })
}

/// Enqueues lines for the send flow. Never blocks.
#[derive(Clone, Debug)]
pub struct LineSender {
    tx: mpsc::UnboundedSender<String>,
}

impl LineSender {
    /// Enqueue one line, without terminator.
    ///
    /// Only the first line of multi-line input is kept, and it is cut to
    /// [`encode::MAX_PAYLOAD_LEN`] bytes on a character boundary. Input that
    /// sanitizes to nothing is dropped.
    ///
    /// # Errors
    ///
    /// [`TransportError::QueueClosed`] once the send flow has stopped.
    pub fn send(&self, line: impl AsRef<str>) -> Result<(), TransportError> {
        let line = encode::sanitize(line.as_ref());
        if line.is_empty() {
            return Ok(());
        }
        self.tx
            .send(line.to_owned())
            .map_err(|_| TransportError::QueueClosed)
    }

    /// True once the receiving end is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving end of the outbound queue.
#[derive(Debug)]
pub struct OutgoingLines {
    rx: mpsc::UnboundedReceiver<String>,
}

impl OutgoingLines {
    /// Wait for the next queued line.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Take a queued line without waiting.
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

/// Inbound lines in the order the server sent them.
#[derive(Debug)]
pub struct IncomingLines {
    rx: mpsc::UnboundedReceiver<String>,
}

impl IncomingLines {
    /// Wait for the next line. `None` once the receive flow has stopped
    /// and every received line was consumed.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

/// IRC transport over a TCP or client-side TLS stream.
#[allow(clippy::large_enum_variant)]
#[non_exhaustive]
pub enum Transport {
    /// Plain TCP transport.
    Tcp {
        /// The connected socket.
        stream: TcpStream,
    },
    /// Client-side TLS-encrypted transport.
    ClientTls {
        /// The established TLS stream.
        stream: Box<ClientTlsStream<TcpStream>>,
    },
}

impl Transport {
    /// Connect to `host:port`, optionally wrapping the socket in TLS.
    ///
    /// TCP keepalive is enabled on the socket. With `tls` set, the server
    /// certificate is **not** validated.
    pub async fn connect(host: &str, port: u16, tls: bool) -> Result<Self, TransportError> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| TransportError::Connect {
                addr: addr.clone(),
                source,
            })?;

        if !tls {
            return Ok(Self::tcp(stream));
        }

        if let Err(e) = enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        warn!(%addr, "TLS enabled without certificate validation; the server is not authenticated");
        let stream = tls::connect(host, stream).await?;
        debug!(%addr, "TLS handshake completed");
        Ok(Self::client_tls(stream))
    }

    /// Wrap a connected TCP stream.
    pub fn tcp(stream: TcpStream) -> Self {
        if let Err(e) = enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        Self::Tcp { stream }
    }

    /// Wrap an established client TLS stream.
    pub fn client_tls(stream: ClientTlsStream<TcpStream>) -> Self {
        Self::ClientTls {
            stream: Box::new(stream),
        }
    }

    /// True for TLS transports.
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::ClientTls { .. })
    }

    /// Run both flows until one of them ends.
    ///
    /// Returns `Ok(())` after a shutdown drained the outbound queue, or when
    /// either queue's other end was dropped. EOF from the server is
    /// [`TransportError::ConnectionClosed`].
    pub async fn run(
        self,
        outgoing: OutgoingLines,
        incoming: mpsc::UnboundedSender<String>,
        shutdown: CancellationToken,
    ) -> Result<(), TransportError> {
        match self {
            Self::Tcp { stream } => run_flows(stream, outgoing, incoming, shutdown).await,
            Self::ClientTls { stream } => run_flows(*stream, outgoing, incoming, shutdown).await,
        }
    }

    /// Spawn [`Transport::run`] on the runtime and hand back the inbound
    /// queue together with the task handle.
    pub fn spawn(
        self,
        outgoing: OutgoingLines,
        shutdown: CancellationToken,
    ) -> (IncomingLines, JoinHandle<Result<(), TransportError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(outgoing, tx, shutdown));
        (IncomingLines { rx }, task)
    }
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));

    sock.set_tcp_keepalive(&keepalive)
}

fn flatten(err: ProtocolError) -> TransportError {
    match err {
        ProtocolError::Io(e) => TransportError::Io(e),
        other => TransportError::Protocol(other),
    }
}

async fn run_flows<S>(
    stream: S,
    outgoing: OutgoingLines,
    incoming: mpsc::UnboundedSender<String>,
    shutdown: CancellationToken,
) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let reader = FramedRead::new(read_half, LineCodec::new());
    let writer = FramedWrite::new(write_half, LineCodec::new());

    tokio::select! {
        result = receive_lines(reader, incoming) => result,
        result = send_lines(writer, outgoing, shutdown) => result,
    }
}

async fn receive_lines<R>(
    mut reader: FramedRead<R, LineCodec>,
    incoming: mpsc::UnboundedSender<String>,
) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
{
    while let Some(line) = reader.next().await {
        let line = line.map_err(flatten)?;
        if incoming.send(line).is_err() {
            return Ok(());
        }
    }
    Err(TransportError::ConnectionClosed)
}

async fn send_lines<W>(
    mut writer: FramedWrite<W, LineCodec>,
    mut outgoing: OutgoingLines,
    shutdown: CancellationToken,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            biased;
            line = outgoing.recv() => match line {
                Some(line) => writer.send(line).await.map_err(flatten)?,
                None => return Ok(()),
            },
            () = shutdown.cancelled() => break,
        }
    }

    while let Some(line) = outgoing.try_recv() {
        writer.feed(line).await.map_err(flatten)?;
    }
    writer.flush().await.map_err(flatten)?;
    writer.get_mut().shutdown().await?;
    Ok(())
}
