// Particle cloud transport - OAuth login, device list, SSE event stream
use crate::application::device_cloud::{CloudError, DeviceCloud, DeviceInfo};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Mutex;
use tokio::sync::mpsc;

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct ParticleCloud {
    base_url: String,
    client: reqwest::Client,
    access_token: Mutex<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DeviceResponse {
    id: String,
    name: String,
}

impl ParticleCloud {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            access_token: Mutex::new(None),
        }
    }

    fn token(&self) -> Result<String, CloudError> {
        self.access_token
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CloudError::Transport("not logged in".to_string()))
    }
}

#[async_trait]
impl DeviceCloud for ParticleCloud {
    async fn login(&self, username: &str, password: &str) -> Result<(), CloudError> {
        let params = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
        ];
        let response = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .basic_auth("particle", Some("particle"))
            .form(&params)
            .send()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(CloudError::Auth);
        }
        if !status.is_success() {
            return Err(CloudError::Transport(format!(
                "login failed with status {}",
                status
            )));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;
        *self.access_token.lock().unwrap() = Some(token.access_token);
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<DeviceInfo>, CloudError> {
        let token = self.token()?;
        let response = self
            .client
            .get(format!("{}/v1/devices", self.base_url))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CloudError::Transport(format!(
                "device list failed with status {}",
                response.status()
            )));
        }

        let devices = response
            .json::<Vec<DeviceResponse>>()
            .await
            .map_err(|e| CloudError::Transport(e.to_string()))?;
        Ok(devices
            .into_iter()
            .map(|d| DeviceInfo {
                id: d.id,
                name: d.name,
            })
            .collect())
    }

    async fn subscribe(&self, prefix: &str) -> Result<mpsc::Receiver<String>, CloudError> {
        let token = self.token()?;
        let url = format!(
            "{}/v1/events/{}?access_token={}",
            self.base_url,
            urlencoding::encode(prefix),
            urlencoding::encode(&token)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CloudError::Subscribe(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CloudError::Subscribe(format!(
                "event stream rejected with status {}",
                response.status()
            )));
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut pending = String::new();
            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        // Fire-and-forget: a dropped stream is logged, not retried
                        tracing::error!("event stream error: {}", e);
                        return;
                    }
                };
                pending.push_str(&String::from_utf8_lossy(&bytes));
                // SSE frames are separated by a blank line
                while let Some(end) = pending.find("\n\n") {
                    let frame = pending[..end].to_string();
                    pending.drain(..end + 2);
                    if let Some(data) = parse_sse_data(&frame) {
                        if tx.send(data).await.is_err() {
                            return;
                        }
                    }
                }
            }
            tracing::warn!("event stream closed by server");
        });

        Ok(rx)
    }
}

/// Pull the raw event payload out of one SSE frame. Particle frames carry an
/// `event:` line followed by a `data:` line holding JSON whose `data` field
/// is the published payload string.
fn parse_sse_data(frame: &str) -> Option<String> {
    for line in frame.lines() {
        let json = match line.strip_prefix("data:") {
            Some(rest) => rest.trim_start(),
            None => continue,
        };
        let value: serde_json::Value = serde_json::from_str(json).ok()?;
        return value.get("data")?.as_str().map(|s| s.to_string());
    }
    None
}
