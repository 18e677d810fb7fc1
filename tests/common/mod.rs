#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

pub const JWT_SECRET: &str = "integration-test-secret";

/// A server process on its own port; killed when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_axion-api"))
            .env("AXION_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("USER_STORE", "memory")
            .env("JWT_SECRET", JWT_SECRET)
            .env("JWT_EXPIRATION", "3600")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and return status plus parsed envelope.
    pub async fn post_json(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn get_with_token(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        Ok((res.status(), res.json().await?))
    }

    pub async fn post_with_token(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.post(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        Ok((res.status(), res.json().await?))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
