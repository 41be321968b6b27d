use std::{env, io, sync, time};

use fdlimit::raise_fd_limit;
use secrecy::SecretString;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use wiremock::MockServer;

use comingsoon::configuration::{get_config, Settings};
use comingsoon::startup::Application;
use comingsoon::telemetry::{get_subscriber, init_subscriber};

/// Ensure the tracing stack is initialized only once
static TRACING: sync::LazyLock<()> = sync::LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            io::stdout,
        ));
    } else {
        init_subscriber(get_subscriber(
            subscriber_name,
            default_filter_level,
            io::sink,
        ));
    };
});

/// Path of the automation trigger on the mock webhook server
pub const WEBHOOK_PATH: &str = "/workflows/signup/invoke";

/// Test application data
pub struct TestApp {
    pub address: String,
    pub webhook_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spin up a test application and return its data
    pub async fn spawn(db_pool: &PgPool) -> Self {
        Self::spawn_with(db_pool, |_| {}).await
    }

    /// Spin up a test application whose subscription store cannot be reached
    pub async fn spawn_with_unreachable_store() -> Self {
        // Nothing listens on port 1
        let conn_opts = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("postgres")
            .database("comingsoon");
        let db_pool = PgPoolOptions::new()
            .acquire_timeout(time::Duration::from_millis(200))
            .connect_lazy_with(conn_opts);
        Self::spawn_with(&db_pool, |c| c.database.store_timeout_millis = 500).await
    }

    /// Spin up a test application, letting the caller tweak the settings
    pub async fn spawn_with(db_pool: &PgPool, customize: impl FnOnce(&mut Settings)) -> Self {
        // Initialize logging
        sync::LazyLock::force(&TRACING);

        // Raise file descriptors limit to avoid "Too many open files" error
        raise_fd_limit().expect("Failed to raise fd limit");

        // Launch a mock server to stand in for the automation webhook
        let webhook_server = MockServer::start().await;

        // Get settings and modify them for testing
        let config = {
            let mut c = get_config().expect("Failed to read configuration");
            // Listen on a random TCP port
            c.application.app_port = 0;
            // Use the mock server as automation webhook, with a signed query like the real one
            c.webhook.url = SecretString::from(format!(
                "{}{WEBHOOK_PATH}?api-version=1&sig=test-signature",
                webhook_server.uri()
            ));
            c.webhook.timeout_millis = 500;
            customize(&mut c);
            c
        };

        // Build the application and get its address
        let app = Application::build_with_db_pool(config, db_pool)
            .await
            .expect("Failed to build application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{port}");

        // Build the API client
        let api_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        // Run the application and return its data
        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(app.run_until_stopped());
        Self {
            address,
            webhook_server,
            api_client,
        }
    }

    /// Perform a POST request to the subscribe endpoint with a raw body
    pub async fn post_subscribe(&self, body: String) -> reqwest::Response {
        self.api_client
            .post(format!("{}/subscribe", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// Perform a POST request to the subscribe endpoint with a JSON body
    pub async fn post_subscribe_json(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_subscribe(body.to_string()).await
    }

    /// Bodies of all the requests received by the mock webhook server
    pub async fn webhook_bodies(&self) -> Vec<serde_json::Value> {
        self.webhook_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

/// Stored subscription record
#[derive(Debug, sqlx::FromRow)]
pub struct StoredSubscription {
    pub email: String,
    pub source: String,
    pub is_active: bool,
    pub converted_to_account: bool,
}

/// Fetch every stored subscription record
pub async fn stored_subscriptions(db_pool: &PgPool) -> Vec<StoredSubscription> {
    sqlx::query_as::<_, StoredSubscription>(
        "SELECT email, source, is_active, converted_to_account FROM subscriptions ORDER BY email",
    )
    .fetch_all(db_pool)
    .await
    .expect("Failed to fetch saved subscriptions")
}

/// Assert: response carries the expected JSON body
pub async fn assert_json_body(response: reqwest::Response, expected: &serde_json::Value) {
    let body: serde_json::Value = response.json().await.expect("Response body is not JSON");
    assert_eq!(&body, expected);
}
