//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser HTTP/1.1 escrito desde cero sobre los bytes de una sola lectura
//! del socket.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /about HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/8.5.0\r\n
//! \r\n
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path HTTP/1.1`, separados por un espacio
//! 2. **Headers**: Pares `Name: Value` (uno por línea, en orden)
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: lo que quede en el buffer, sin reensamblar
//!
//! Un request que no cabe en la lectura no se reensambla: llega como
//! `ParseError::Incomplete` o con el body truncado.

use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

/// Versiones HTTP aceptadas en la request line
const SUPPORTED_VERSIONS: [&str; 2] = ["HTTP/1.0", "HTTP/1.1"];

/// Representa un request HTTP parseado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método tal cual llegó (GET, POST, ...)
    method: String,

    /// Request target completo (ej: "/about?x=1")
    path: String,

    /// Versión HTTP ("HTTP/1.0" o "HTTP/1.1")
    version: String,

    /// Headers en orden, sin fusionar duplicados
    headers: Vec<(String, String)>,

    /// Bytes que siguen a la línea vacía
    body: Vec<u8>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request vacío
    #[error("empty request")]
    Empty,

    /// La request line no termina en CRLF
    #[error("request line is not terminated by CRLF")]
    MissingCrlf,

    /// La cabecera no es UTF-8
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,

    /// La request line no tiene exactamente tres tokens
    #[error("invalid request line: {0:?}")]
    InvalidRequestLine(String),

    /// Versión distinta de HTTP/1.0 y HTTP/1.1
    #[error("unsupported HTTP version: {0}")]
    UnsupportedVersion(String),

    /// Header sin ':' o con nombre vacío
    #[error("invalid header line: {0:?}")]
    InvalidHeader(String),

    /// Faltó la línea vacía que cierra los headers
    #[error("header section is not terminated by an empty line")]
    Incomplete,

    /// Chunked no está soportado
    #[error("unsupported transfer encoding: {0}")]
    UnsupportedTransferEncoding(String),
}

impl Request {
    /// Parsea un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use wirehttp::http::Request;
    ///
    /// let raw = b"GET /about HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.path(), "/about");
    /// assert_eq!(request.header("host"), Some("localhost"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.is_empty() {
            return Err(ParseError::Empty);
        }

        // 1. Request line
        let (line, mut rest) = split_line(buffer).ok_or(ParseError::MissingCrlf)?;
        let (method, path, version) = Self::parse_request_line(line)?;

        // 2. Headers hasta la línea vacía
        let mut headers = Vec::new();
        loop {
            let (line, next) = split_line(rest).ok_or(ParseError::Incomplete)?;
            rest = next;
            if line.is_empty() {
                break;
            }
            headers.push(Self::parse_header(line)?);
        }

        if let Some((_, encoding)) = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("Transfer-Encoding"))
        {
            if encoding.to_ascii_lowercase().contains("chunked") {
                return Err(ParseError::UnsupportedTransferEncoding(encoding.clone()));
            }
        }

        // 3. Body: lo que queda en el buffer
        Ok(Request {
            method,
            path,
            version,
            headers,
            body: rest.to_vec(),
        })
    }

    /// Formato: `GET /path HTTP/1.1`, con un solo espacio entre tokens
    fn parse_request_line(line: &[u8]) -> Result<(String, String, String), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;

        let parts: Vec<&str> = line.split(' ').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(ParseError::InvalidRequestLine(line.to_string()));
        }

        let version = parts[2];
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ParseError::UnsupportedVersion(version.to_string()));
        }

        Ok((parts[0].to_string(), parts[1].to_string(), version.to_string()))
    }

    /// Formato: `Name: Value`
    fn parse_header(line: &[u8]) -> Result<(String, String), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidEncoding)?;

        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => Ok((
                name.to_string(),
                value.trim_matches(|c| c == ' ' || c == '\t').to_string(),
            )),
            _ => Err(ParseError::InvalidHeader(line.to_string())),
        }
    }

    // === Accessors ===

    /// Método HTTP
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request target tal cual se escribió
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Todos los headers en orden de llegada
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Primer valor de un header (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// Separa la primera línea terminada en CRLF del resto
fn split_line(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    buf.windows(CRLF.len())
        .position(|w| w == CRLF)
        .map(|pos| (&buf[..pos], &buf[pos + CRLF.len()..]))
}
