//! # Canal TLS
//! src/transport/tls.rs
//!
//! Variante cifrada del canal. Todo el trabajo criptográfico lo hace rustls:
//! aquí sólo se maneja el ciclo de vida de la conexión.
//!
//! ## Handshake
//!
//! `TlsChannel::accept` bloquea el thread de la conexión hasta que rustls
//! termina de negociar:
//!
//! 1. **ClientHello**: el cliente ofrece versiones y cipher suites
//! 2. **ServerHello**: elegimos versión (>= la mínima configurada) y suite
//! 3. **Certificate**: presentamos la cadena de `TlsIdentity`
//! 4. **Key Exchange**: ambos derivan las llaves de sesión
//! 5. **Finished**: cada lado verifica que derivó las mismas llaves
//!
//! Si algo falla se intenta mandar la alerta, se cierra el socket y se
//! retorna `HandshakeError`. El parser nunca ve bytes de esa conexión.

use std::fs;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::sync::Arc;

use rustls::{
    CipherSuite, ProtocolVersion, ServerConfig, ServerConnection, StreamOwned,
    SupportedProtocolVersion,
};
use rustls_pki_types::pem::{self, PemObject};
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use tracing::{debug, info};

use super::{read_once, shutdown_socket, Acceptor, Channel};
use crate::error::{HandshakeError, ServerError};

/// Versión mínima de TLS que acepta el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TlsVersion {
    /// TLS 1.2 y 1.3
    #[default]
    #[value(name = "1.2")]
    Tls12,

    /// Sólo TLS 1.3
    #[value(name = "1.3")]
    Tls13,
}

impl TlsVersion {
    fn protocol_versions(self) -> &'static [&'static SupportedProtocolVersion] {
        static TLS12_AND_UP: [&SupportedProtocolVersion; 2] =
            [&rustls::version::TLS13, &rustls::version::TLS12];
        static TLS13_ONLY: [&SupportedProtocolVersion; 1] = [&rustls::version::TLS13];

        match self {
            TlsVersion::Tls12 => &TLS12_AND_UP,
            TlsVersion::Tls13 => &TLS13_ONLY,
        }
    }
}

/// Certificado + llave privada, cargados una vez y compartidos por todos
/// los handshakes
#[derive(Debug, Clone)]
pub struct TlsIdentity {
    config: Arc<ServerConfig>,
}

impl TlsIdentity {
    /// Carga la identidad desde archivos PEM
    ///
    /// El certificado puede traer la cadena completa. La llave puede ser
    /// PKCS#8, PKCS#1 o SEC1.
    pub fn from_pem_files(
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
        min_version: TlsVersion,
    ) -> Result<Self, ServerError> {
        let cert_path = cert_path.as_ref();
        let key_path = key_path.as_ref();

        let cert_pem = read_file(cert_path)?;
        let key_pem = read_file(key_path)?;

        let certs = CertificateDer::pem_slice_iter(&cert_pem)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| pem_error(cert_path, source))?;
        if certs.is_empty() {
            return Err(pem_error(cert_path, pem::Error::NoItemsFound));
        }

        let key =
            PrivateKeyDer::from_pem_slice(&key_pem).map_err(|source| pem_error(key_path, source))?;

        Self::from_der(certs, key, min_version)
    }

    /// Construye la identidad desde material ya decodificado
    pub fn from_der(
        certs: Vec<CertificateDer<'static>>,
        key: PrivateKeyDer<'static>,
        min_version: TlsVersion,
    ) -> Result<Self, ServerError> {
        let config = ServerConfig::builder_with_protocol_versions(min_version.protocol_versions())
            .with_no_client_auth()
            .with_single_cert(certs, key)?;

        Ok(Self {
            config: Arc::new(config),
        })
    }

    fn config(&self) -> Arc<ServerConfig> {
        Arc::clone(&self.config)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ServerError> {
    fs::read(path).map_err(|source| ServerError::Identity {
        path: path.to_path_buf(),
        source,
    })
}

fn pem_error(path: &Path, source: pem::Error) -> ServerError {
    ServerError::Pem {
        path: path.to_path_buf(),
        source,
    }
}

/// Canal sobre una sesión TLS ya negociada
#[derive(Debug)]
pub struct TlsChannel {
    stream: StreamOwned<ServerConnection, TcpStream>,
    peer: SocketAddr,
}

impl TlsChannel {
    /// Hace el handshake completo sobre `stream`
    ///
    /// Sólo retorna `Ok` con la sesión establecida.
    pub fn accept(
        mut stream: TcpStream,
        peer: SocketAddr,
        identity: &TlsIdentity,
    ) -> Result<Self, HandshakeError> {
        let mut conn = ServerConnection::new(identity.config()).map_err(|e| HandshakeError {
            peer,
            source: io::Error::other(e),
        })?;

        while conn.is_handshaking() {
            if let Err(source) = conn.complete_io(&mut stream) {
                // complete_io ya intentó escribir la alerta; sólo falta cerrar
                let _ = conn.write_tls(&mut stream);
                let _ = shutdown_socket(&stream);
                return Err(HandshakeError { peer, source });
            }
        }

        Ok(Self {
            stream: StreamOwned::new(conn, stream),
            peer,
        })
    }

    /// Versión de TLS negociada
    pub fn protocol_version(&self) -> Option<ProtocolVersion> {
        self.stream.conn.protocol_version()
    }

    /// Cipher suite negociada
    pub fn cipher_suite(&self) -> Option<CipherSuite> {
        self.stream.conn.negotiated_cipher_suite().map(|suite| suite.suite())
    }
}

impl Channel for TlsChannel {
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
        read_once(&mut self.stream, max_bytes)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(bytes.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.stream.conn.send_close_notify();
        if let Err(e) = self.stream.flush() {
            debug!(peer = %self.peer, cause = %e, "close_notify not delivered");
        }
        shutdown_socket(&self.stream.sock)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

/// Acceptor HTTPS: negocia TLS con la identidad compartida
#[derive(Debug, Clone)]
pub struct TlsAcceptor {
    identity: TlsIdentity,
}

impl TlsAcceptor {
    pub fn new(identity: TlsIdentity) -> Self {
        Self { identity }
    }
}

impl Acceptor for TlsAcceptor {
    type Channel = TlsChannel;

    fn establish(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
    ) -> Result<TlsChannel, HandshakeError> {
        debug!(%peer, "starting TLS handshake");
        let channel = TlsChannel::accept(stream, peer, &self.identity)?;

        info!(
            %peer,
            protocol = ?channel.protocol_version(),
            cipher = ?channel.cipher_suite(),
            "TLS handshake complete"
        );
        Ok(channel)
    }

    fn scheme(&self) -> &'static str {
        "https"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    fn load(cert: &str, key: &str) -> Result<TlsIdentity, ServerError> {
        TlsIdentity::from_pem_files(fixture(cert), fixture(key), TlsVersion::Tls12)
    }

    #[test]
    fn test_load_identity() {
        assert!(load("server.crt", "server.key").is_ok());
    }

    #[test]
    fn test_missing_certificate() {
        let err = load("missing.crt", "server.key").unwrap_err();

        match err {
            ServerError::Identity { path, source } => {
                assert!(path.ends_with("missing.crt"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_key_file_without_certificate() {
        // server.key no contiene ningún bloque CERTIFICATE
        let err = load("server.key", "server.key").unwrap_err();
        assert!(matches!(err, ServerError::Pem { .. }));
    }

    #[test]
    fn test_certificate_file_without_key() {
        let err = load("server.crt", "server.crt").unwrap_err();
        assert!(matches!(err, ServerError::Pem { .. }));
    }

    #[test]
    fn test_version_sets() {
        let versions = |v: TlsVersion| {
            v.protocol_versions()
                .iter()
                .map(|p| p.version)
                .collect::<Vec<_>>()
        };

        assert_eq!(
            versions(TlsVersion::Tls12),
            [ProtocolVersion::TLSv1_3, ProtocolVersion::TLSv1_2]
        );
        assert_eq!(versions(TlsVersion::Tls13), [ProtocolVersion::TLSv1_3]);
    }
}
