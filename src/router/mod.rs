//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea paths HTTP a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! El match es exacto sobre el request target, query string incluida, y el
//! método no se usa para decidir. Si no hay handler para ese path, retorna 404 Not Found.
//!
//! La tabla se arma una vez al arrancar y después el servidor sólo la
//! comparte como `Arc<Router>`, de solo lectura.

use crate::http::{Request, Response, StatusCode};

/// Body fijo de la respuesta 404
pub const NOT_FOUND_BODY: &str =
    "<html><body><h1>404 Not Found</h1><p>The page you requested was not found.</p></body></html>";

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!("wirehttp/", env!("CARGO_PKG_VERSION"));

/// Un handler recibe un Request y retorna una Response
pub type Handler = fn(&Request) -> Response;

/// Router que mapea paths a handlers
#[derive(Debug, Default)]
pub struct Router {
    /// Pares path → handler, en orden de registro
    routes: Vec<(String, Handler)>,
}

impl Router {
    /// Crea un router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// Registrar dos veces el mismo path reemplaza el handler anterior.
    ///
    /// # Ejemplo
    /// ```
    /// use wirehttp::router::Router;
    /// use wirehttp::http::{Request, Response, StatusCode};
    ///
    /// fn hello_handler(_req: &Request) -> Response {
    ///     Response::text(StatusCode::Ok, "hello")
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register("/hello", hello_handler);
    /// ```
    pub fn register(&mut self, path: &str, handler: Handler) {
        match self.routes.iter_mut().find(|(p, _)| p == path) {
            Some(entry) => entry.1 = handler,
            None => self.routes.push((path.to_string(), handler)),
        }
    }

    /// Encuentra y ejecuta el handler para un request
    ///
    /// Si no encuentra un handler para el path, retorna 404 Not Found.
    ///
    /// # Ejemplo
    /// ```
    /// use wirehttp::router::Router;
    /// use wirehttp::http::{Request, StatusCode};
    ///
    /// let router = Router::new();
    /// let request = Request::parse(b"GET /test HTTP/1.1\r\n\r\n").unwrap();
    /// assert_eq!(router.route(&request).status(), StatusCode::NotFound);
    /// ```
    pub fn route(&self, request: &Request) -> Response {
        let mut response = match self.lookup(request.path()) {
            Some(handler) => handler(request),
            None => Response::html(StatusCode::NotFound, NOT_FOUND_BODY),
        };

        response.add_header("Server", SERVER_NAME);
        response
    }

    /// Paths registrados, en orden
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(p, _)| p.as_str())
    }

    fn lookup(&self, path: &str) -> Option<Handler> {
        self.routes
            .iter()
            .find(|(registered, _)| registered == path)
            .map(|(_, handler)| *handler)
    }
}
