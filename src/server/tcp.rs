//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Listener que acepta conexiones y lanza un thread por cada una. El
//! thread hace el handshake (si es TLS), atiende el request y muere; no se
//! reutiliza.
//!
//! Lo único compartido entre threads es el `Router` y la identidad TLS
//! dentro del acceptor, ambos de solo lectura.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info, info_span, warn};

use super::connection;
use super::limiter::ConnectionLimiter;
use crate::config::Config;
use crate::error::{ConnectionError, ServerError};
use crate::http::{Response, StatusCode};
use crate::router::Router;
use crate::transport::Acceptor;

/// Servidor HTTP/1.1 con un thread por conexión
pub struct Server<A: Acceptor> {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Arc<Router>,
    acceptor: Arc<A>,
    limiter: ConnectionLimiter,
    read_buffer_size: usize,
    retry_after_secs: u64,
    shutdown: Arc<AtomicBool>,
}

/// Detiene el accept loop desde otro thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl<A: Acceptor> Server<A> {
    /// Hace bind en `config.address()`
    ///
    /// Si el puerto está ocupado o no hay permisos, retorna el error antes
    /// de empezar a servir.
    pub fn bind(config: &Config, router: Router, acceptor: A) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            addr: address.clone(),
            source,
        })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: address,
            source,
        })?;

        Ok(Self {
            listener,
            local_addr,
            router: Arc::new(router),
            acceptor: Arc::new(acceptor),
            limiter: ConnectionLimiter::new(config.max_connections),
            read_buffer_size: config.read_buffer_size,
            retry_after_secs: config.retry_after_secs,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            wake_addr: wake_address(self.local_addr),
        }
    }

    /// Corre el accept loop hasta que se llame `ShutdownHandle::shutdown`
    ///
    /// Los errores de `accept` se loguean y el loop sigue.
    pub fn run(self) {
        info!(
            addr = %self.local_addr,
            scheme = self.acceptor.scheme(),
            routes = ?self.router.paths().collect::<Vec<_>>(),
            max_connections = self.limiter.max(),
            "server listening"
        );

        let mut next_id: u64 = 0;
        for incoming in self.listener.incoming() {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match incoming {
                Ok(stream) => {
                    next_id += 1;
                    self.dispatch(stream, next_id);
                }
                Err(e) => warn!(cause = %e, "failed to accept connection"),
            }
        }

        info!(active = self.limiter.active(), "server stopped");
    }

    fn dispatch(&self, stream: TcpStream, id: u64) {
        let peer = match stream.peer_addr() {
            Ok(peer) => peer,
            Err(e) => {
                debug!(cause = %e, "connection dropped before dispatch");
                return;
            }
        };

        let Some(permit) = self.limiter.try_acquire() else {
            warn!(%peer, active = self.limiter.active(), "connection limit reached, rejecting");
            let response =
                Response::text(StatusCode::ServiceUnavailable, "503 Service Unavailable\n")
                    .with_header("Retry-After", &self.retry_after_secs.to_string());
            self.acceptor.reject(stream, &response);
            return;
        };

        debug!(%peer, id, active = self.limiter.active(), "new connection");

        let acceptor = Arc::clone(&self.acceptor);
        let router = Arc::clone(&self.router);
        let read_buffer_size = self.read_buffer_size;

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let _permit = permit;
                let span = info_span!("connection", id, %peer);
                let _enter = span.enter();

                let result = acceptor
                    .establish(stream, peer)
                    .map_err(ConnectionError::from)
                    .and_then(|channel| connection::serve(channel, &router, read_buffer_size));

                match result {
                    Ok(outcome) => debug!(?outcome, "connection finished"),
                    Err(ConnectionError::Handshake(e)) => {
                        warn!(cause = %e.source, "TLS handshake failed")
                    }
                    Err(e) => warn!(cause = %e, "connection error"),
                }
            });

        if let Err(e) = spawned {
            error!(%peer, cause = %e, "failed to spawn connection thread");
        }
    }
}

impl ShutdownHandle {
    /// Marca el flag y despierta el `accept` bloqueado
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Err(e) = TcpStream::connect(self.wake_addr) {
            debug!(cause = %e, "failed to wake accept loop");
        }
    }
}

/// Un listener en 0.0.0.0 se despierta conectando por loopback
fn wake_address(local: SocketAddr) -> SocketAddr {
    let ip = match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages;
    use crate::transport::PlainAcceptor;
    use std::io::{Read, Write};
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            port: Some(0),
            ..Config::default()
        }
    }

    fn get(addr: SocketAddr, path: &str) -> String {
        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client
            .write_all(format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path).as_bytes())
            .unwrap();

        let mut response = String::new();
        client.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_bind_conflict_is_fatal() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = Config {
            port: Some(taken.local_addr().unwrap().port()),
            ..Config::default()
        };

        let result = Server::bind(&config, pages::plain_router(), PlainAcceptor);
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        for read_buffer_size in [0, crate::config::MAX_READ_BUFFER_SIZE + 1] {
            let config = Config {
                read_buffer_size,
                ..test_config()
            };

            let result = Server::bind(&config, pages::plain_router(), PlainAcceptor);
            assert!(matches!(result, Err(ServerError::Config(_))), "{}", read_buffer_size);
        }
    }

    #[test]
    fn test_serves_and_shuts_down() {
        let server = Server::bind(&test_config(), pages::plain_router(), PlainAcceptor).unwrap();
        let addr = server.local_addr();
        let handle = server.shutdown_handle();
        let t = thread::spawn(move || server.run());

        let response = get(addr, "/about");
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

        handle.shutdown();
        t.join().unwrap();
    }

    #[test]
    fn test_limit_rejects_with_503() {
        let config = Config {
            max_connections: 1,
            retry_after_secs: 7,
            ..test_config()
        };
        let server = Server::bind(&config, pages::plain_router(), PlainAcceptor).unwrap();
        let addr = server.local_addr();
        let handle = server.shutdown_handle();
        let t = thread::spawn(move || server.run());

        // Conexión que ocupa el único lugar sin mandar nada
        let idle = TcpStream::connect(addr).unwrap();
        thread::sleep(Duration::from_millis(100));

        // Sin mandar request: el 503 llega igual y no queda nada sin leer
        let mut rejected = TcpStream::connect(addr).unwrap();
        rejected.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut response = String::new();
        rejected.read_to_string(&mut response).unwrap();
        assert!(response.starts_with("HTTP/1.1 503 Service Unavailable\r\n"), "{}", response);
        assert!(response.contains("Retry-After: 7\r\n"));

        drop(idle);
        handle.shutdown();
        t.join().unwrap();
    }

    #[test]
    fn test_wake_address() {
        let any: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        assert_eq!(wake_address(any), "127.0.0.1:8080".parse().unwrap());

        let local: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        assert_eq!(wake_address(local), local);
    }
}
