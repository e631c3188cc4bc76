//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes y lanza un thread por cada una
//! 3. Lee y parsea el request del canal (plano o TLS)
//! 4. Genera y envía la response, y cierra

pub mod connection;
pub mod limiter;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::Outcome;
pub use limiter::ConnectionLimiter;
pub use tcp::{Server, ShutdownHandle};
