//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./wirehttp --port 8080
//! ./wirehttp --tls --cert certs/server.crt --key certs/server.key
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 ./wirehttp
//! HTTP_TLS=true TLS_CERT=certs/server.crt TLS_KEY=certs/server.key ./wirehttp
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::transport::TlsVersion;

/// Puerto por defecto del servidor HTTP plano
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Puerto por defecto del servidor HTTPS
pub const DEFAULT_HTTPS_PORT: u16 = 8443;

/// Tope del buffer de lectura; se reserva uno por conexión
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "wirehttp")]
#[command(about = "Servidor HTTP/1.1 concurrente sobre sockets TCP, con variante TLS")]
#[command(version)]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Puerto (por defecto 8080, o 8443 con --tls)
    #[arg(short, long, env = "HTTP_PORT")]
    pub port: Option<u16>,

    // === TLS ===

    /// Sirve HTTPS en vez de HTTP
    #[arg(long, env = "HTTP_TLS")]
    pub tls: bool,

    /// Certificado PEM (puede incluir la cadena)
    #[arg(long, default_value = "certs/server.crt", env = "TLS_CERT")]
    pub cert: PathBuf,

    /// Llave privada PEM
    #[arg(long, default_value = "certs/server.key", env = "TLS_KEY")]
    pub key: PathBuf,

    /// Versión mínima de TLS aceptada
    #[arg(long = "tls-min-version", value_enum, default_value = "1.2", env = "TLS_MIN_VERSION")]
    pub tls_min_version: TlsVersion,

    // === Conexiones ===

    /// Bytes que se leen del socket por request (una sola lectura)
    #[arg(long = "read-buffer-size", default_value = "8192", env = "READ_BUFFER_SIZE")]
    pub read_buffer_size: usize,

    /// Máximo de conexiones simultáneas (0 = sin límite)
    #[arg(long = "max-connections", default_value = "0", env = "MAX_CONNECTIONS")]
    pub max_connections: usize,

    /// Valor de Retry-After en los 503 por límite de conexiones
    #[arg(long = "retry-after-secs", default_value = "1", env = "RETRY_AFTER_SECS")]
    pub retry_after_secs: u64,
}

impl Config {
    /// Crea la configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Puerto efectivo según la variante
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.tls { DEFAULT_HTTPS_PORT } else { DEFAULT_HTTP_PORT })
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use wirehttp::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.effective_port())
        } else {
            format!("{}:{}", self.host, self.effective_port())
        }
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.read_buffer_size == 0 {
            return Err("Read buffer size must be >= 1".to_string());
        }
        if self.read_buffer_size > MAX_READ_BUFFER_SIZE {
            return Err(format!(
                "Read buffer size must be <= {} bytes, got {}",
                MAX_READ_BUFFER_SIZE, self.read_buffer_size
            ));
        }
        Ok(())
    }

    /// Loguea un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            tls = self.tls,
            read_buffer_size = self.read_buffer_size,
            max_connections = self.max_connections,
            "configuration loaded"
        );
        if self.tls {
            info!(
                cert = %self.cert.display(),
                key = %self.key.display(),
                min_version = ?self.tls_min_version,
                "TLS enabled"
            );
        }
    }
}

impl Default for Config {
    /// Configuración por defecto: HTTP plano en 127.0.0.1:8080
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
            tls: false,
            cert: PathBuf::from("certs/server.crt"),
            key: PathBuf::from("certs/server.key"),
            tls_min_version: TlsVersion::Tls12,
            read_buffer_size: 8192,
            max_connections: 0,
            retry_after_secs: 1,
        }
    }
}
