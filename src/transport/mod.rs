//! # Transporte
//! src/transport/mod.rs
//!
//! Abstracción sobre el stream de bytes de una conexión. El handler de
//! conexión se escribe una sola vez contra `Channel` y corre igual sobre
//! TCP plano o sobre TLS.
//!
//! ```text
//! TcpStream ──► Acceptor::establish ──► Channel ──► connection::serve
//!                  (handshake TLS)
//! ```
//!
//! - `plain`: pasa los bytes sin tocarlos
//! - `tls`: negocia el handshake con rustls antes de entregar el canal

pub mod plain;
pub mod tls;

use std::io;
use std::net::{SocketAddr, TcpStream};

use crate::error::HandshakeError;
use crate::http::Response;

pub use plain::{PlainAcceptor, PlainChannel};
pub use tls::{TlsAcceptor, TlsChannel, TlsIdentity, TlsVersion};

/// Contrato de lectura/escritura de una conexión, independiente del cifrado
pub trait Channel: Send {
    /// Lee como máximo `max_bytes`. Un vector vacío indica EOF.
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>>;

    /// Escribe todos los bytes y hace flush. Retorna cuántos se escribieron.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Cierra la conexión. Llamarlo más de una vez no es un error.
    fn close(&mut self) -> io::Result<()>;

    /// Dirección del cliente
    fn peer_addr(&self) -> SocketAddr;
}

/// Convierte un socket aceptado en un `Channel` listo para usar
///
/// Para TLS esto incluye el handshake completo: si falla, el socket se
/// cierra y nunca llega un canal a medio negociar al handler.
pub trait Acceptor: Send + Sync + 'static {
    type Channel: Channel + 'static;

    fn establish(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<Self::Channel, HandshakeError>;

    /// "http" o "https", para los logs
    fn scheme(&self) -> &'static str;

    /// Rechaza una conexión cuando se alcanzó el límite de concurrencia
    ///
    /// Por defecto sólo cierra el socket.
    fn reject(&self, stream: TcpStream, _response: &Response) {
        drop(stream);
    }
}

/// `read` que reintenta si la llamada fue interrumpida por una señal
pub(crate) fn read_once<R: io::Read>(reader: &mut R, max_bytes: usize) -> io::Result<Vec<u8>> {
    let mut buffer = vec![0u8; max_bytes];
    loop {
        match reader.read(&mut buffer) {
            Ok(n) => {
                buffer.truncate(n);
                return Ok(buffer);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Cierra ambos sentidos del socket, ignorando si el peer ya se fue
pub(crate) fn shutdown_socket(stream: &TcpStream) -> io::Result<()> {
    match stream.shutdown(std::net::Shutdown::Both) {
        Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
        other => other,
    }
}
