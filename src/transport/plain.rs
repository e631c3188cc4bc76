//! # Canal TCP plano
//! src/transport/plain.rs

use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream};

use tracing::debug;

use super::{read_once, shutdown_socket, Acceptor, Channel};
use crate::error::HandshakeError;
use crate::http::Response;

/// Canal sobre un `TcpStream` sin cifrar
#[derive(Debug)]
pub struct PlainChannel {
    stream: TcpStream,
    peer: SocketAddr,
}

impl PlainChannel {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }
}

impl Channel for PlainChannel {
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
        read_once(&mut self.stream, max_bytes)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(bytes.len())
    }

    fn close(&mut self) -> io::Result<()> {
        shutdown_socket(&self.stream)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

/// Acceptor de HTTP plano: no hay nada que negociar
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAcceptor;

impl Acceptor for PlainAcceptor {
    type Channel = PlainChannel;

    fn establish(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<PlainChannel, HandshakeError> {
        Ok(PlainChannel::new(stream, peer))
    }

    fn scheme(&self) -> &'static str {
        "http"
    }

    /// En texto plano sí se puede contestar el 503 antes de cerrar
    fn reject(&self, mut stream: TcpStream, response: &Response) {
        if let Err(e) = stream.write_all(&response.to_bytes()) {
            debug!(cause = %e, "failed to write rejection");
        }
        let _ = shutdown_socket(&stream);
    }
}
