//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas HTTP/1.1 y convertirlas a bytes para
//! enviarlas por el canal.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html; charset=utf-8\r\n
//! Content-Length: 13\r\n
//! Connection: close\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```
//!
//! `Content-Length` y `Connection` los escribe siempre `to_bytes`: cualquier
//! valor que haya puesto el handler se descarta.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use wirehttp::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello");
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"\r\n\r\nHello"));
//! ```

use super::StatusCode;

/// Headers que controla el builder y nunca se copian del handler
const MANAGED_HEADERS: [&str; 2] = ["Content-Length", "Connection"];

/// Content-Type de todas las páginas HTML del servidor
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Representa una respuesta HTTP/1.1 completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers en orden de inserción
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (versión builder)
    ///
    /// # Ejemplo
    /// ```
    /// use wirehttp::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_header("Content-Type", "application/json");
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente
    ///
    /// Los headers se escriben en el orden en que se agregan; un nombre
    /// repetido produce dos líneas.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Establece el cuerpo desde un string
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Crea una respuesta HTML
    ///
    /// # Ejemplo
    /// ```
    /// use wirehttp::http::{Response, StatusCode};
    ///
    /// let response = Response::html(StatusCode::Ok, "<h1>Hola</h1>");
    /// assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));
    /// ```
    pub fn html(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", HTML_CONTENT_TYPE)
            .with_body(body)
    }

    /// Crea una respuesta de texto plano
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body)
    }

    /// Valor de `Content-Length` que se escribirá en el cable
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Convierte la respuesta a los bytes exactos que se envían
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers en orden de inserción: `Name: Value\r\n`
    /// - `Content-Length` calculado del body y `Connection: close`
    /// - Línea vacía: `\r\n`
    /// - Body tal cual
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            if is_managed(name) {
                continue;
            }
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        result.extend_from_slice(b"Connection: close\r\n");
        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Headers agregados por el handler, en orden
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Primer header con ese nombre (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Obtiene el body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn is_managed(name: &str) -> bool {
    MANAGED_HEADERS.iter().any(|m| m.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(response: &Response) -> String {
        String::from_utf8(response.to_bytes()).unwrap()
    }

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_exact_framing() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("Test");

        assert_eq!(
            as_text(&response),
            "HTTP/1.1 200 OK\r\n\
             Content-Type: text/plain\r\n\
             Content-Length: 4\r\n\
             Connection: close\r\n\
             \r\n\
             Test"
        );
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let response = Response::new(StatusCode::Ok)
            .with_header("X-B", "2")
            .with_header("X-A", "1")
            .with_header("X-B", "3");

        let text = as_text(&response);
        let b = text.find("X-B: 2").unwrap();
        let a = text.find("X-A: 1").unwrap();
        let b2 = text.find("X-B: 3").unwrap();
        assert!(b < a && a < b2);
    }

    #[test]
    fn test_caller_content_length_is_ignored() {
        let response = Response::new(StatusCode::Ok)
            .with_header("content-length", "999")
            .with_header("Connection", "keep-alive")
            .with_body("abc");

        let text = as_text(&response);
        assert!(text.contains("Content-Length: 3\r\n"));
        assert!(!text.contains("999"));
        assert!(!text.contains("keep-alive"));
        assert_eq!(text.matches("Connection:").count(), 1);
    }

    #[test]
    fn test_content_length_matches_multibyte_body() {
        // 🔒 son 4 bytes en UTF-8
        for body in ["", "a", "🔒 cifrado", "línea\r\nlínea"] {
            let response = Response::html(StatusCode::Ok, body);
            let text = as_text(&response);
            let expected = format!("Content-Length: {}\r\n", body.len());
            assert!(text.contains(&expected), "body {:?}", body);
            assert_eq!(response.content_length(), body.len());
        }
    }

    #[test]
    fn test_binary_body_verbatim() {
        let binary_data = vec![0x00, 0x01, 0x02, 0xFF];
        let response = Response::new(StatusCode::Ok).with_body_bytes(binary_data.clone());

        let bytes = response.to_bytes();
        assert!(bytes.ends_with(&[b'\r', b'\n', b'\r', b'\n', 0x00, 0x01, 0x02, 0xFF]));
    }

    #[test]
    fn test_empty_body_response() {
        let response = Response::new(StatusCode::NoContent);
        let text = as_text(&response);

        assert!(text.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert!(text.contains("Content-Length: 0\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
