//! Connectivity monitor
//!
//! Combines an external "network is up" signal with a periodic probe of
//! the server's health route, and publishes the result on a watch channel.

use std::{sync::Arc, time::Duration};

use reqwest::Client;
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};

use crate::api::health::{HealthResponse, STATUS_OK};

/// How often the health route is probed
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Upper bound on a single probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// The device reports a network connection
    pub is_online: bool,
    /// The last health probe succeeded
    pub is_server_available: bool,
}

/// Derived connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Available,
    /// Network is up but the server did not answer the probe
    Unavailable,
    Offline,
}

impl ConnectionStatus {
    pub fn state(&self) -> Connectivity {
        match (self.is_online, self.is_server_available) {
            (false, _) => Connectivity::Offline,
            (true, true) => Connectivity::Available,
            (true, false) => Connectivity::Unavailable,
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            is_online: true,
            is_server_available: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub health_url: String,
    pub interval: Duration,
    pub timeout: Duration,
}

impl MonitorConfig {
    /// Probe `{api_base_url}/health` with the default timings
    pub fn new(api_base_url: &str) -> Self {
        Self {
            health_url: format!("{}/health", api_base_url.trim_end_matches('/')),
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

pub struct ConnectivityMonitor {
    http: Client,
    config: MonitorConfig,
    status: watch::Sender<ConnectionStatus>,
}

impl ConnectivityMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self {
            http: Client::new(),
            config,
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Feed the platform's network signal. Going offline marks the server
    /// unavailable at once; coming back triggers an immediate probe.
    pub async fn set_network_online(&self, online: bool) -> ConnectionStatus {
        if !online {
            tracing::info!("Network offline");
            self.publish(ConnectionStatus {
                is_online: false,
                is_server_available: false,
            });
            return self.status();
        }

        self.status.send_if_modified(|status| {
            let changed = !status.is_online;
            status.is_online = true;
            changed
        });
        self.check_now().await
    }

    /// Probe the server once and publish the outcome
    pub async fn check_now(&self) -> ConnectionStatus {
        let current = self.status();
        if !current.is_online {
            return current;
        }

        let available = self.probe().await;
        // The network may have gone away while the probe was in flight
        self.status.send_if_modified(|status| {
            if !status.is_online || status.is_server_available == available {
                return false;
            }
            let next = ConnectionStatus {
                is_online: true,
                is_server_available: available,
            };
            tracing::info!("Connectivity changed: {:?} -> {:?}", status.state(), next.state());
            *status = next;
            true
        });
        self.status()
    }

    fn publish(&self, next: ConnectionStatus) {
        self.status.send_if_modified(|status| {
            if *status == next {
                return false;
            }
            tracing::info!("Connectivity changed: {:?} -> {:?}", status.state(), next.state());
            *status = next;
            true
        });
    }

    async fn probe(&self) -> bool {
        let response = match self
            .http
            .get(&self.config.health_url)
            .timeout(self.config.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Health probe failed: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Health probe returned {}", response.status());
            return false;
        }

        match response.json::<HealthResponse>().await {
            Ok(health) => health.status == STATUS_OK,
            Err(e) => {
                tracing::debug!("Unreadable health response: {}", e);
                false
            }
        }
    }

    /// Start polling on a fixed interval. The first probe runs immediately.
    pub fn spawn(self: Arc<Self>) -> MonitorHandle {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.check_now().await;
            }
        });
        MonitorHandle { task }
    }
}

/// Stops the polling task when dropped
pub struct MonitorHandle {
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
