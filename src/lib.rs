//! # wirehttp
//! src/lib.rs
//!
//! Servidor HTTP/1.1 concurrente implementado directamente sobre sockets
//! TCP, con una variante que negocia TLS antes de exponer el mismo canal.
//! Sirve para ver el protocolo a nivel de bytes: framing manual de
//! requests y responses, un thread por conexión y handshake TLS.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing de requests y construcción de responses HTTP/1.1
//! - `router`: Enrutamiento exacto de paths a handlers
//! - `pages`: Handlers de las páginas y tablas de rutas de cada variante
//! - `transport`: Canal plano o TLS (rustls) con el mismo contrato
//! - `server`: Accept loop, thread por conexión y manejo de cada conexión
//! - `config`: Argumentos CLI y variables de entorno
//! - `error`: Errores de arranque, handshake y conexión
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use wirehttp::config::Config;
//! use wirehttp::pages;
//! use wirehttp::server::Server;
//! use wirehttp::transport::PlainAcceptor;
//!
//! let config = Config::default();
//! let server = Server::bind(&config, pages::plain_router(), PlainAcceptor)
//!     .expect("Error al iniciar servidor");
//! server.run();
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod pages;
pub mod router;
pub mod server;
pub mod transport;
