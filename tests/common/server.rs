//! Scripted IRC server.
//!
//! Listens on an ephemeral loopback port; each test accepts the bot's
//! connection and plays the server side line by line.

use std::time::Duration;

use slirc_bot::BotSettings;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// How long a test waits for any single line.
pub const WAIT: Duration = Duration::from_secs(5);

/// A listening mock server.
pub struct MockServer {
    listener: TcpListener,
    port: u16,
}

impl MockServer {
    /// Bind to 127.0.0.1 on a free port.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Settings pointing a bot at this server.
    pub fn settings(&self, nick: &str) -> BotSettings {
        let mut settings = BotSettings::new("127.0.0.1", self.port, nick);
        settings.connect_timeout = Duration::from_secs(5);
        settings.registration_timeout = Duration::from_secs(5);
        settings
    }

    /// Accept the bot's connection.
    pub async fn accept(&self) -> anyhow::Result<Peer> {
        let (socket, _) = timeout(WAIT, self.listener.accept()).await??;
        let (read, write) = socket.into_split();
        Ok(Peer {
            reader: BufReader::new(read),
            writer: write,
        })
    }
}

/// The server side of one accepted connection.
pub struct Peer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Peer {
    /// Send one line; CRLF is appended.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line from the bot, without terminator. `None` on EOF.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Next line from the bot; EOF is an error.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(WAIT)
            .await?
            .ok_or_else(|| anyhow::anyhow!("connection closed"))
    }

    /// Receive one line and check it.
    pub async fn expect(&mut self, expected: &str) -> anyhow::Result<()> {
        let line = self.recv().await?;
        anyhow::ensure!(line == expected, "expected {expected:?}, got {line:?}");
        Ok(())
    }

    /// Receive lines until one satisfies `predicate`; returns all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Every line received within `window`, stopping early at EOF.
    pub async fn collect_for(&mut self, window: Duration) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + window;
        let mut lines = Vec::new();
        loop {
            let left = deadline.saturating_duration_since(tokio::time::Instant::now());
            match self.recv_timeout(left).await {
                Ok(Some(line)) => lines.push(line),
                Ok(None) | Err(_) => return lines,
            }
        }
    }

    /// Read until the bot closes its side; returns the lines seen.
    pub async fn recv_to_eof(&mut self) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.recv_timeout(WAIT).await? {
            lines.push(line);
        }
        Ok(lines)
    }

    /// Play a plain registration: expect NICK and USER, answer 001.
    pub async fn register(&mut self, nick: &str) -> anyhow::Result<()> {
        self.expect(&format!("NICK {nick}")).await?;
        let user = self.recv().await?;
        anyhow::ensure!(user.starts_with("USER "), "expected USER, got {user:?}");
        self.send(&format!(":irc.test 001 {nick} :Welcome to the test network"))
            .await
    }
}
