//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Ciclo completo de una conexión, sobre cualquier `Channel`:
//!
//! ```text
//! read (una sola vez) → parse → route → to_bytes → write → close
//! ```
//!
//! El canal se cierra en todos los caminos, incluso si falla la lectura o
//! la escritura. Un request que no cabe en una lectura no se reensambla.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::ConnectionError;
use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use crate::transport::Channel;

/// Qué pasó con la conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Se envió una respuesta con este status
    Served(StatusCode),

    /// El cliente cerró sin mandar nada
    Closed,
}

/// Atiende una conexión y cierra el canal
pub fn serve<C: Channel>(
    mut channel: C,
    router: &Router,
    read_buffer_size: usize,
) -> Result<Outcome, ConnectionError> {
    let result = respond(&mut channel, router, read_buffer_size);
    let closed = channel.close().map_err(ConnectionError::Close);

    let outcome = result?;
    closed?;
    Ok(outcome)
}

fn respond<C: Channel>(
    channel: &mut C,
    router: &Router,
    read_buffer_size: usize,
) -> Result<Outcome, ConnectionError> {
    let start = Instant::now();
    let peer = channel.peer_addr();

    let buffer = channel.read(read_buffer_size).map_err(ConnectionError::Read)?;
    if buffer.is_empty() {
        debug!(%peer, "peer closed without sending data");
        return Ok(Outcome::Closed);
    }
    debug!(bytes = buffer.len(), "request received");

    let response = match Request::parse(&buffer) {
        Ok(request) => {
            info!(method = request.method(), path = request.path(), "request");
            router.route(&request)
        }
        Err(e) => {
            warn!(%peer, cause = %e, "malformed request");
            Response::text(StatusCode::BadRequest, &format!("400 Bad Request: {}\n", e))
        }
    };

    let written = channel
        .write(&response.to_bytes())
        .map_err(ConnectionError::Write)?;

    info!(
        status = response.status().as_u16(),
        bytes = written,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "response sent"
    );

    Ok(Outcome::Served(response.status()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages;
    use std::io;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    /// Canal en memoria para ver qué se escribió y si se cerró
    #[derive(Default)]
    struct State {
        input: Vec<u8>,
        output: Vec<u8>,
        reads: usize,
        closed: bool,
        fail_read: bool,
        fail_write: bool,
    }

    #[derive(Clone, Default)]
    struct MockChannel(Arc<Mutex<State>>);

    impl MockChannel {
        fn with_input(input: &[u8]) -> Self {
            let channel = Self::default();
            channel.0.lock().unwrap().input = input.to_vec();
            channel
        }

        fn output(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap().output).into_owned()
        }

        fn closed(&self) -> bool {
            self.0.lock().unwrap().closed
        }
    }

    impl Channel for MockChannel {
        fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
            let mut state = self.0.lock().unwrap();
            state.reads += 1;
            if state.fail_read {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            let n = max_bytes.min(state.input.len());
            Ok(state.input.drain(..n).collect())
        }

        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            let mut state = self.0.lock().unwrap();
            if state.fail_write {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
            }
            state.output.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn close(&mut self) -> io::Result<()> {
            self.0.lock().unwrap().closed = true;
            Ok(())
        }

        fn peer_addr(&self) -> SocketAddr {
            "127.0.0.1:50000".parse().unwrap()
        }
    }

    fn run(channel: &MockChannel, read_buffer_size: usize) -> Result<Outcome, ConnectionError> {
        serve(channel.clone(), &pages::plain_router(), read_buffer_size)
    }

    #[test]
    fn test_serves_home() {
        let channel = MockChannel::with_input(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");

        let outcome = run(&channel, 8192).unwrap();

        assert_eq!(outcome, Outcome::Served(StatusCode::Ok));
        let output = channel.output();
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.contains("Welcome"));
        assert!(output.contains("Connection: close\r\n"));
        assert!(channel.closed());
    }

    #[test]
    fn test_not_found() {
        let channel = MockChannel::with_input(b"GET /nope HTTP/1.1\r\n\r\n");

        assert_eq!(run(&channel, 8192).unwrap(), Outcome::Served(StatusCode::NotFound));
        assert!(channel.output().starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn test_malformed_request_gets_400() {
        let channel = MockChannel::with_input(b"GET\r\n\r\n");

        assert_eq!(run(&channel, 8192).unwrap(), Outcome::Served(StatusCode::BadRequest));
        let output = channel.output();
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(output.contains("invalid request line"));
        assert!(channel.closed());
    }

    #[test]
    fn test_single_read_only() {
        // El buffer corta el request: no se vuelve a leer para completarlo
        let channel = MockChannel::with_input(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");

        assert_eq!(run(&channel, 10).unwrap(), Outcome::Served(StatusCode::BadRequest));
        assert_eq!(channel.0.lock().unwrap().reads, 1);
    }

    #[test]
    fn test_empty_read_closes_silently() {
        let channel = MockChannel::with_input(b"");

        assert_eq!(run(&channel, 8192).unwrap(), Outcome::Closed);
        assert!(channel.output().is_empty());
        assert!(channel.closed());
    }

    #[test]
    fn test_read_error_still_closes() {
        let channel = MockChannel::default();
        channel.0.lock().unwrap().fail_read = true;

        assert!(matches!(run(&channel, 8192), Err(ConnectionError::Read(_))));
        assert!(channel.closed());
    }

    #[test]
    fn test_write_error_still_closes() {
        let channel = MockChannel::with_input(b"GET / HTTP/1.1\r\n\r\n");
        channel.0.lock().unwrap().fail_write = true;

        assert!(matches!(run(&channel, 8192), Err(ConnectionError::Write(_))));
        assert!(channel.closed());
    }
}
