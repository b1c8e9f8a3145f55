use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use crate::error::ConnectionError;
use crate::protocol::{encode, LogicalState, WireCommand};

struct Session {
    stream: TcpStream,
    peer: SocketAddr,
}

/// Listening side of the command channel.
///
/// Serves at most one peer at a time: a new peer is only accepted once the
/// current session is gone.
pub struct CommandServer {
    listener: TcpListener,
    session: Option<Session>,
    newline: bool,
}

impl CommandServer {
    /// Binds `host:port`. With `newline` set every command is followed by `\n`.
    pub fn bind(host: &str, port: u16, newline: bool) -> Result<Self, ConnectionError> {
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr).map_err(|source| ConnectionError::Bind {
            addr: addr.clone(),
            source,
        })?;
        log::info!("Server started on {}", addr);

        Ok(Self {
            listener,
            session: None,
            newline,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.session.as_ref().map(|s| s.peer)
    }

    /// Blocks until a peer connects. Returns the current peer if a session is
    /// already open.
    pub fn accept(&mut self) -> Result<SocketAddr, ConnectionError> {
        if let Some(peer) = self.peer() {
            return Ok(peer);
        }

        log::info!("Waiting for connection...");
        let (stream, peer) = self.listener.accept().map_err(ConnectionError::Accept)?;
        // Commands are two bytes; do not let Nagle hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            log::warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
        }
        log::info!("Client connected from {}", peer);

        self.session = Some(Session { stream, peer });
        Ok(peer)
    }

    /// Writes the command for `state` to the peer.
    ///
    /// A failed write closes the session; the caller decides whether to
    /// accept a new peer.
    pub fn send(&mut self, state: LogicalState) -> Result<WireCommand, ConnectionError> {
        let session = self.session.as_mut().ok_or(ConnectionError::NotConnected)?;
        let command = encode(state);

        let result = if self.newline {
            session.stream.write_all(&command.framed())
        } else {
            session.stream.write_all(command.as_bytes())
        };

        match result.and_then(|()| session.stream.flush()) {
            Ok(()) => Ok(command),
            Err(e) => {
                log::warn!("Send to {} failed, closing connection", session.peer);
                self.session = None;
                Err(ConnectionError::Send(e))
            }
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("Disconnected from {}", session.peer);
        }
    }
}
