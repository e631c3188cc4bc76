//! # Páginas del Servidor
//! src/pages.rs
//!
//! Handlers de las páginas HTML y las tablas de rutas de cada variante:
//!
//! - `/`: Bienvenida
//! - `/about`: Sobre el proyecto
//! - `/encryption`: Cómo funciona el handshake (solo variante TLS)

use crate::http::{Request, Response, StatusCode};
use crate::router::Router;

const HOME_PAGE: &str = "<html><body><h1>Welcome to the wirehttp server!</h1>\
<p>This is built from scratch on raw TCP sockets.</p></body></html>";

const ABOUT_PAGE: &str = "<html><body><h1>About</h1>\
<p>This is a learning project - an HTTP/1.1 server from scratch in Rust.</p></body></html>";

const TLS_HOME_PAGE: &str = "<html>
<body>
<h1>🔒 Welcome to the wirehttp HTTPS server!</h1>
<p>This connection is <strong>encrypted with TLS</strong>.</p>
<p>Built from scratch to understand HTTPS internals.</p>
<ul>
<li><a href=\"/about\">About</a></li>
<li><a href=\"/encryption\">How Encryption Works</a></li>
</ul>
</body>
</html>";

const TLS_ABOUT_PAGE: &str = "<html>
<body>
<h1>About</h1>
<p>This is a learning project - an HTTPS server from scratch in Rust.</p>
<p>The connection uses TLS encryption to secure communication.</p>
</body>
</html>";

const ENCRYPTION_PAGE: &str = "<html>
<body>
<h1>🔐 How This Encryption Works</h1>
<h2>TLS Handshake (Key Exchange):</h2>
<ol>
<li><strong>ClientHello:</strong> Your browser sends supported versions and ciphers</li>
<li><strong>ServerHello:</strong> Server responds with the chosen version and cipher</li>
<li><strong>Certificate:</strong> Server sends its certificate (public key)</li>
<li><strong>Key Exchange:</strong> Both sides contribute to a shared secret</li>
<li><strong>Session Keys:</strong> Both derive symmetric keys from the shared secret</li>
<li><strong>Finished:</strong> Each side proves it derived the same keys</li>
</ol>
<h2>Encrypted Communication:</h2>
<p>After the handshake, all data is encrypted with symmetric encryption.</p>
<p>This page was transmitted encrypted! 🔒</p>
</body>
</html>";

/// Handler para `/` (variante plana)
pub fn home_handler(_req: &Request) -> Response {
    Response::html(StatusCode::Ok, HOME_PAGE)
}

/// Handler para `/about` (variante plana)
pub fn about_handler(_req: &Request) -> Response {
    Response::html(StatusCode::Ok, ABOUT_PAGE)
}

/// Handler para `/` (variante TLS), enlaza a las otras páginas
pub fn tls_home_handler(_req: &Request) -> Response {
    Response::html(StatusCode::Ok, TLS_HOME_PAGE)
}

/// Handler para `/about` (variante TLS)
pub fn tls_about_handler(_req: &Request) -> Response {
    Response::html(StatusCode::Ok, TLS_ABOUT_PAGE)
}

/// Handler para `/encryption`
///
/// Explica los pasos del handshake que acaba de ocurrir en la conexión.
pub fn encryption_handler(_req: &Request) -> Response {
    Response::html(StatusCode::Ok, ENCRYPTION_PAGE)
}

/// Tabla de rutas del servidor HTTP plano
pub fn plain_router() -> Router {
    let mut router = Router::new();
    router.register("/", home_handler);
    router.register("/about", about_handler);
    router
}

/// Tabla de rutas del servidor HTTPS
pub fn tls_router() -> Router {
    let mut router = Router::new();
    router.register("/", tls_home_handler);
    router.register("/about", tls_about_handler);
    router.register("/encryption", encryption_handler);
    router
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(router: &Router, path: &str) -> Response {
        let raw = format!("GET {} HTTP/1.1\r\n\r\n", path);
        router.route(&Request::parse(raw.as_bytes()).unwrap())
    }

    fn body(response: &Response) -> String {
        String::from_utf8(response.body().to_vec()).unwrap()
    }

    #[test]
    fn test_plain_routes() {
        let router = plain_router();

        let home = get(&router, "/");
        assert_eq!(home.status(), StatusCode::Ok);
        assert!(body(&home).contains("Welcome"));

        let about = get(&router, "/about");
        assert_eq!(about.status(), StatusCode::Ok);
        assert!(body(&about).contains("About"));

        assert_eq!(get(&router, "/encryption").status(), StatusCode::NotFound);
        assert_eq!(get(&router, "/nope").status(), StatusCode::NotFound);
    }

    #[test]
    fn test_query_string_is_not_stripped() {
        let router = plain_router();

        assert_eq!(get(&router, "/about?x=1").status(), StatusCode::NotFound);
        assert_eq!(get(&router, "/?lang=es").status(), StatusCode::NotFound);
    }

    #[test]
    fn test_tls_routes() {
        let router = tls_router();

        assert!(body(&get(&router, "/")).contains("encrypted with TLS"));
        assert_eq!(get(&router, "/about").status(), StatusCode::Ok);

        let encryption = get(&router, "/encryption");
        assert_eq!(encryption.status(), StatusCode::Ok);
        assert!(body(&encryption).contains("ClientHello"));
    }

    #[test]
    fn test_pages_are_html() {
        let response = get(&plain_router(), "/");
        assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));
    }
}
