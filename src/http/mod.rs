//! # Módulo HTTP
//!
//! Implementa el framing HTTP/1.1 desde cero, sin librerías de alto nivel:
//!
//! - Parsing de requests (request line + headers + body de una lectura)
//! - Construcción de responses byte a byte
//! - Códigos de estado
//!
//! ## Lo que NO hace
//!
//! - Conexiones persistentes: toda respuesta lleva `Connection: close`
//! - Chunked transfer encoding
//! - Reensamblar requests que llegan en varias lecturas

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Esto permite usar `http::Request` en vez de `http::request::Request`
pub use request::{ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
