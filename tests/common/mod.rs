#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sqlx::PgPool;
use uuid::Uuid;

use senbox_api::auth::{Role, Subject, SubjectKind};
use senbox_api::config::AppConfig;
use senbox_api::database::DatabaseManager;
use senbox_api::AppState;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_senbox-api"));
        cmd.env("API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            // Degraded health still means the server is up
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// State over a lazy pool; nothing connects unless a handler reaches the database
pub fn offline_state() -> AppState {
    let config = AppConfig::development();
    let db = DatabaseManager::connect_lazy(&config.database).expect("lazy pool");
    AppState::new(config, db).expect("app state")
}

pub fn token_for(state: &AppState, role: Role) -> String {
    state
        .tokens
        .generate_token(&Subject {
            id: Uuid::new_v4(),
            kind: SubjectKind::User,
            role,
            organization_id: None,
        })
        .expect("token")
        .token
}

/// Migrated pool when DATABASE_URL is set; `None` makes database tests skip
pub async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        }
    };

    let pool = PgPool::connect(&url).await.expect("connect to DATABASE_URL");
    DatabaseManager::from_pool(pool.clone())
        .migrate()
        .await
        .expect("apply migrations");
    Some(pool)
}
