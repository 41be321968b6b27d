use std::{io, net};

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::routes::{health_check, subscribe, StoreTimeout};
use crate::webhook_client::WebhookClient;

/// Application
pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    /// Build an application based on settings
    pub async fn build(config: Settings) -> anyhow::Result<Self> {
        // Connect to the database lazily, signups are accepted even if it is down
        let db_pool = PgPoolOptions::new()
            .acquire_timeout(config.database.store_timeout())
            .connect_lazy_with(config.database.db_options());

        // Run the HTTP server and return its data
        Self::build_with_db_pool(config, &db_pool).await
    }

    /// Build an application based on settings and database pool
    pub async fn build_with_db_pool(config: Settings, db_pool: &PgPool) -> anyhow::Result<Self> {
        // Build the webhook client
        let webhook_client = config.webhook.client()?;
        let store_timeout = StoreTimeout(config.database.store_timeout());

        // Run the HTTP server and return its data
        let listener = net::TcpListener::bind(format!(
            "{}:{}",
            config.application.app_host, config.application.app_port
        ))?;
        let port = listener.local_addr()?.port();
        let server = run_server(listener, db_pool.clone(), webhook_client, store_timeout)?;
        Ok(Self { server, port })
    }

    /// Get application port
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Run application until it is stopped
    pub async fn run_until_stopped(self) -> io::Result<()> {
        self.server.await
    }
}

/// Run the HTTP server
pub fn run_server(
    listener: net::TcpListener,
    db_pool: PgPool,
    webhook_client: WebhookClient,
    store_timeout: StoreTimeout,
) -> io::Result<Server> {
    // Prepare data to be added the application context
    let db_pool = web::Data::new(db_pool);
    let webhook_client = web::Data::new(webhook_client);
    let store_timeout = web::Data::new(store_timeout);

    // Start the HTTP server
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/subscribe", web::post().to(subscribe))
            .app_data(db_pool.clone())
            .app_data(webhook_client.clone())
            .app_data(store_timeout.clone())
    })
    .listen(listener)?
    .run())
}
