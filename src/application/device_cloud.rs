// Device cloud boundary - trait over the IoT cloud transport
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum CloudError {
    #[error("wrong credentials or no internet connectivity, please try again")]
    Auth,
    #[error("could not subscribe to events: {0}")]
    Subscribe(String),
    #[error("cloud transport error: {0}")]
    Transport(String),
}

/// A device registered to the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait DeviceCloud: Send + Sync {
    /// Authenticate the account; must complete before any other call.
    async fn login(&self, username: &str, password: &str) -> Result<(), CloudError>;

    /// List devices registered to the account.
    async fn list_devices(&self) -> Result<Vec<DeviceInfo>, CloudError>;

    /// Subscribe to all events whose name starts with `prefix`. Raw event
    /// payloads arrive on the returned channel in delivery order; the
    /// channel closes when the transport drops the stream.
    async fn subscribe(&self, prefix: &str) -> Result<mpsc::Receiver<String>, CloudError>;
}
