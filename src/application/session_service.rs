// Session service - login/subscribe state machine over the device cloud
use crate::application::device_cloud::{CloudError, DeviceCloud};
use crate::application::ingest_service::IngestService;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Session lifecycle. Every failure state is terminal: there is no
/// automatic retry, the caller reports once and stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggingIn,
    LoggedIn,
    LoginFailed,
    LoginTimedOut,
    Subscribing,
    Subscribed,
    SubscribeFailed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("wrong credentials or no internet connectivity, please try again")]
    Auth(#[source] CloudError),
    #[error("login did not complete within {0:?}")]
    LoginTimedOut(Duration),
    #[error("could not subscribe to events")]
    Subscribe(#[source] CloudError),
}

pub struct SessionService {
    cloud: Arc<dyn DeviceCloud>,
    ingest: Arc<IngestService>,
    login_timeout: Duration,
    state: Mutex<SessionState>,
}

impl SessionService {
    pub fn new(
        cloud: Arc<dyn DeviceCloud>,
        ingest: Arc<IngestService>,
        login_timeout: Duration,
    ) -> Self {
        Self {
            cloud,
            ingest,
            login_timeout,
            state: Mutex::new(SessionState::LoggedOut),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock().unwrap() = next;
    }

    /// Run the whole flow once: login (bounded by the configured timeout),
    /// advisory device lookup, then subscribe and attach the event feed to
    /// the ingest buffer.
    pub async fn connect(
        &self,
        username: &str,
        password: &str,
        device_name: &str,
        event_prefix: &str,
    ) -> Result<(), SessionError> {
        self.set_state(SessionState::LoggingIn);
        match tokio::time::timeout(self.login_timeout, self.cloud.login(username, password)).await
        {
            Err(_) => {
                self.set_state(SessionState::LoginTimedOut);
                return Err(SessionError::LoginTimedOut(self.login_timeout));
            }
            Ok(Err(e)) => {
                self.set_state(SessionState::LoginFailed);
                return Err(SessionError::Auth(e));
            }
            Ok(Ok(())) => {
                self.set_state(SessionState::LoggedIn);
                tracing::info!("logged in");
            }
        }

        self.check_device(device_name).await;

        self.set_state(SessionState::Subscribing);
        match self.cloud.subscribe(event_prefix).await {
            Ok(events) => {
                self.ingest.attach(events);
                self.set_state(SessionState::Subscribed);
                tracing::info!("subscribed to \"{}\" events", event_prefix);
                Ok(())
            }
            Err(e) => {
                self.set_state(SessionState::SubscribeFailed);
                Err(SessionError::Subscribe(e))
            }
        }
    }

    /// Advisory only: a missing device is logged, not fatal.
    async fn check_device(&self, device_name: &str) {
        match self.cloud.list_devices().await {
            Ok(devices) => match devices.iter().find(|d| d.name == device_name) {
                Some(device) => {
                    tracing::info!("successfully retrieved device {} ({})", device.name, device.id);
                }
                None => {
                    tracing::warn!("device {} not registered to this account", device_name);
                }
            },
            Err(e) => {
                tracing::warn!("device lookup failed, check your internet connectivity: {}", e);
            }
        }
    }

    /// Tear the session down: stop the event feed and return to LoggedOut.
    pub fn shutdown(&self) {
        self.ingest.shutdown();
        self.set_state(SessionState::LoggedOut);
    }
}
