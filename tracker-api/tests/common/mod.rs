#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::RateLimiter;
use auth::TokenService;
use serde_json::json;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use serde_json::Value;
use tracker_api::domain::user::ports::UserNotifier;
use tracker_api::domain::user::service::RateLimits;
use tracker_api::domain::user::service::UserService;
use tracker_api::inbound::http::router::create_router;
use tracker_api::outbound::repositories::InMemoryUserRepository;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const STRONG_PASSWORD: &str = "Str0ng!Pass";

/// Mail recorded by [`CapturingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    PasswordReset { to: String, token: String },
    PasswordChanged { to: String },
}

/// Notifier that keeps mails in memory so tests can read reset tokens.
#[derive(Debug, Default)]
pub struct CapturingNotifier {
    sent: Mutex<Vec<SentMail>>,
}

impl CapturingNotifier {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_reset_token(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|mail| match mail {
            SentMail::PasswordReset { token, .. } => Some(token),
            SentMail::PasswordChanged { .. } => None,
        })
    }
}

#[async_trait]
impl UserNotifier for CapturingNotifier {
    async fn send_password_reset(&self, to: &str, _name: &str, token: &str) {
        self.sent.lock().unwrap().push(SentMail::PasswordReset {
            to: to.to_string(),
            token: token.to_string(),
        });
    }

    async fn send_password_changed(&self, to: &str, _name: &str) {
        self.sent
            .lock()
            .unwrap()
            .push(SentMail::PasswordChanged { to: to.to_string() });
    }
}

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub notifier: Arc<CapturingNotifier>,
    pub tokens: Arc<TokenService>,
}

/// Tokens and id returned by a successful login.
pub struct Session {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let notifier = Arc::new(CapturingNotifier::default());
        let tokens = Arc::new(TokenService::new(TEST_SECRET));

        let user_service = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&notifier),
            PasswordHasher::with_cost(1),
            Arc::clone(&tokens),
            Arc::new(RateLimiter::new()),
            RateLimits::default(),
        ));

        let application = create_router(user_service, Arc::clone(&tokens));
        tokio::spawn(async move {
            axum::serve(listener, application)
                .await
                .expect("Server failed");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            notifier,
            tokens,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.patch(self.url(path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path))
    }

    /// Register `email` with the strong test password and return the user body.
    pub async fn register(&self, email: &str) -> Value {
        let response = self
            .post("/register")
            .json(&json!({ "email": email, "password": STRONG_PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register and log in, returning the session.
    pub async fn signed_up(&self, email: &str) -> Session {
        self.register(email).await;
        let response = self.login(email, STRONG_PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        Session {
            user_id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
            access_token: body["data"]["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["data"]["refresh_token"].as_str().unwrap().to_string(),
        }
    }
}

/// Throwaway Postgres database with migrations applied.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    admin_url: String,
}

impl TestDb {
    /// Create a uniquely named database on the server at `DATABASE_URL`.
    ///
    /// Returns `None` when `DATABASE_URL` is unset, so database tests are
    /// skipped on machines without Postgres.
    pub async fn from_env() -> Option<Self> {
        let admin_url = std::env::var("DATABASE_URL").ok()?;
        let db_name = format!(
            "test_tracker_api_{}",
            uuid::Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&admin_url)
            .await
            .expect("Failed to connect to Postgres");
        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = admin_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            admin_url,
        })
    }

    /// Close the pool and drop the database.
    pub async fn teardown(self) {
        self.pool.close().await;

        if let Ok(mut conn) = PgConnection::connect(&self.admin_url).await {
            let _ = conn
                .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, self.db_name).as_str())
                .await;
        }
    }
}
