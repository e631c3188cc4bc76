//! # wirehttp - Entry Point
//! src/main.rs
//!
//! Lee la configuración, carga la identidad TLS si hace falta y corre el
//! accept loop hasta recibir Ctrl+C.

use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use wirehttp::config::Config;
use wirehttp::error::ServerError;
use wirehttp::pages;
use wirehttp::router::Router;
use wirehttp::server::Server;
use wirehttp::transport::{Acceptor, PlainAcceptor, TlsAcceptor, TlsIdentity};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "wirehttp=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new();

    if let Err(e) = run(&config) {
        error!(cause = %e, "fatal error");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), ServerError> {
    config.validate().map_err(ServerError::Config)?;
    config.log_summary();

    if config.tls {
        let identity =
            TlsIdentity::from_pem_files(&config.cert, &config.key, config.tls_min_version)?;
        serve(config, pages::tls_router(), TlsAcceptor::new(identity))
    } else {
        serve(config, pages::plain_router(), PlainAcceptor)
    }
}

fn serve<A: Acceptor>(config: &Config, router: Router, acceptor: A) -> Result<(), ServerError> {
    let server = Server::bind(config, router, acceptor)?;

    let handle = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("shutdown signal received");
        handle.shutdown();
    }) {
        warn!(cause = %e, "failed to install Ctrl+C handler");
    }

    server.run();
    Ok(())
}
