// API server implementation
// Author: Gabriel Demetrios Lafis

use std::net::SocketAddr;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::info;

use crate::storage::SessionStore;
use super::routes;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub enable_cors: bool,
    pub max_upload_bytes: usize,
    pub preview_rows: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: num_cpus::get(),
            enable_cors: false,
            max_upload_bytes: 200 * 1024 * 1024,
            preview_rows: 5,
        }
    }
}

/// State shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    /// Rows returned in upload previews
    pub preview_rows: usize,
}

impl AppState {
    pub fn new(sessions: Arc<SessionStore>, preview_rows: usize) -> Self {
        AppState {
            sessions,
            preview_rows,
        }
    }
}

/// API server
pub struct Server {
    config: ServerConfig,
    sessions: Arc<SessionStore>,
}

impl Server {
    /// Create a new API server
    pub fn new(sessions: Arc<SessionStore>, config: ServerConfig) -> Self {
        Server { config, sessions }
    }

    /// Run the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let addr = addr.parse::<SocketAddr>().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}: {}", addr, e))
        })?;

        let state = AppState::new(self.sessions.clone(), self.config.preview_rows);
        let enable_cors = self.config.enable_cors;
        let max_upload_bytes = self.config.max_upload_bytes;

        info!(
            "Starting server at http://{} with {} workers",
            addr, self.config.workers
        );

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::PayloadConfig::new(max_upload_bytes))
                .wrap(middleware::Logger::default())
                .wrap(middleware::Condition::new(enable_cors, cors))
                .configure(routes::configure)
        })
        .workers(self.config.workers.max(1))
        .bind(addr)?
        .run()
        .await
    }
}
