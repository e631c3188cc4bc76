//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de errores. Ninguno sale de la conexión que lo produjo:
//!
//! - `ServerError`: fatales, antes de empezar a servir (bind, certificados)
//! - `HandshakeError`: la negociación TLS falló, se cierra sin responder
//! - `ConnectionError`: fallo de I/O a mitad de una conexión, se cierra sin reintentar
//!
//! Los errores de parsing viven en `http::ParseError` y terminan en un 400.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Errores fatales de arranque
#[derive(Debug, Error)]
pub enum ServerError {
    /// No se pudo hacer bind (puerto en uso, permisos, ...)
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// No se pudo leer el certificado o la llave
    #[error("failed to load {}: {source}", path.display())]
    Identity {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// El PEM no contiene un certificado o llave válidos
    #[error("invalid PEM in {}: {source}", path.display())]
    Pem {
        path: PathBuf,
        #[source]
        source: rustls_pki_types::pem::Error,
    },

    /// rustls rechazó la combinación certificado + llave
    #[error("TLS configuration rejected: {0}")]
    Tls(#[from] rustls::Error),

    /// Configuración inválida
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Falló la negociación TLS con un cliente
#[derive(Debug, Error)]
#[error("TLS handshake with {peer} failed: {source}")]
pub struct HandshakeError {
    pub peer: SocketAddr,
    #[source]
    pub source: io::Error,
}

/// Errores de una conexión individual
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("close failed: {0}")]
    Close(#[source] io::Error),
}
