//! HTTP transport for the sync protocol.
//!
//! Carries sync requests over reqwest to an ordered list of sync servers.
//! Transport-level failures and 5xx replies fail over to the next server in
//! the list; a 4xx reply is the server's verdict and is returned as-is.

use super::{SyncMethod, SyncReply, SyncRequest, SyncTransport};
use crate::config::SyncConfig;
use crate::error::SyncError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct HttpSyncTransport {
    client: Client,
    servers: Vec<String>,
}

impl HttpSyncTransport {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Ok(HttpSyncTransport {
            client,
            servers: config.servers.clone(),
        })
    }

    /// Build a transport over an explicit server list with default timeouts.
    pub fn with_servers(servers: Vec<String>) -> Result<Self, SyncError> {
        let config = SyncConfig {
            servers,
            ..SyncConfig::default()
        };
        Self::new(&config)
    }
}

#[async_trait]
impl SyncTransport for HttpSyncTransport {
    async fn sync_request(
        &self,
        method: SyncMethod,
        path: &str,
        body: &SyncRequest,
    ) -> Result<SyncReply, SyncError> {
        if self.servers.is_empty() {
            return Err(SyncError::NoServers);
        }

        let mut last_error = SyncError::NoServers;
        for server in &self.servers {
            let url = format!("{}{}", server.trim_end_matches('/'), path);
            let request = match method {
                SyncMethod::Get => self.client.get(&url),
                SyncMethod::Post => self.client.post(&url).json(body),
            };

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(server = %server, "sync server unreachable: {}", e);
                    last_error = SyncError::Transport(e.to_string());
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return response
                    .json::<SyncReply>()
                    .await
                    .map_err(|e| SyncError::MalformedReply(e.to_string()));
            }

            let message = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                tracing::warn!(server = %server, status = status.as_u16(), "sync server error");
                last_error = SyncError::Server {
                    status: status.as_u16(),
                    message,
                };
                continue;
            }

            // 4xx is the server's verdict on this request, not a server
            // outage; trying another server would just repeat it.
            return Err(SyncError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Err(last_error)
    }
}
