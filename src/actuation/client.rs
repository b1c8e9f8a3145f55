use std::io::{self, Read};
use std::net::TcpStream;
use std::time::Duration;

use crate::device::IndicatorPair;
use crate::error::ConnectionError;
use crate::protocol::CommandFramer;

/// Why a receive session stopped.
#[derive(Debug)]
pub enum SessionEnd {
    /// The sensing node closed the stream (zero-length read).
    PeerClosed,
    /// The read failed or timed out.
    Failed(ConnectionError),
}

/// Receiving side of the command channel.
///
/// Generic over the byte source so the session logic can be driven from
/// memory as well as from a socket.
pub struct CommandClient<S = TcpStream> {
    stream: S,
    framer: CommandFramer,
    buffer: Vec<u8>,
    applied: usize,
    ignored: usize,
}

impl CommandClient<TcpStream> {
    /// Connects to the sensing node at `host:port`.
    pub fn connect(
        host: &str,
        port: u16,
        recv_buffer: usize,
        read_timeout: Option<Duration>,
    ) -> Result<Self, ConnectionError> {
        let addr = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&addr).map_err(|source| ConnectionError::Connect {
            addr: addr.clone(),
            source,
        })?;
        stream
            .set_read_timeout(read_timeout)
            .map_err(|source| ConnectionError::Connect {
                addr: addr.clone(),
                source,
            })?;
        log::info!("Connected to server {}", addr);

        Ok(Self::from_stream(stream, recv_buffer))
    }
}

impl<S: Read> CommandClient<S> {
    pub fn from_stream(stream: S, recv_buffer: usize) -> Self {
        Self {
            stream,
            framer: CommandFramer::new(),
            buffer: vec![0; recv_buffer.max(1)],
            applied: 0,
            ignored: 0,
        }
    }

    /// Receives and applies commands until the stream ends.
    ///
    /// Invalid commands and failed pin writes are logged and skipped; neither
    /// ends the session.
    pub fn run(&mut self, outputs: &mut IndicatorPair) -> SessionEnd {
        loop {
            let len = match self.stream.read(&mut self.buffer) {
                Ok(0) => {
                    log::info!("Server closed connection");
                    return SessionEnd::PeerClosed;
                }
                Ok(len) => len,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("Connection closed: {}", e);
                    return SessionEnd::Failed(ConnectionError::Receive(e));
                }
            };

            self.dispatch(len, outputs);
        }
    }

    fn dispatch(&mut self, len: usize, outputs: &mut IndicatorPair) {
        let chunk = &self.buffer[..len];
        log::debug!("Received {} bytes: {:?}", len, String::from_utf8_lossy(chunk));

        for frame in self.framer.push(chunk) {
            match frame {
                Ok(state) => match outputs.apply(state) {
                    Ok(()) => {
                        self.applied += 1;
                        log::info!("GPIO write: {}", state);
                    }
                    Err(e) => log::error!("Failed to apply {}: {}", state, e),
                },
                Err(e) => {
                    self.ignored += 1;
                    log::warn!("Ignored invalid command: {}", e);
                }
            }
        }
    }

    /// Commands written to the lines so far.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Frames rejected by the codec so far.
    pub fn ignored(&self) -> usize {
        self.ignored
    }
}
