//! Wallet session state
//!
//! Explicit replacement for an ambient wallet context: whoever owns the
//! connection updates the session, and the aggregator reads a copy of it
//! at the start of every fetch.

use alloy_primitives::Address;
use tracing::{error, info, warn};

use metamoney_core::{Connector, NetworkId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    active: bool,
    account: Option<Address>,
    network_id: Option<NetworkId>,
    connector: Connector,
    error: Option<String>,
}

impl WalletSession {
    pub fn new(connector: Connector) -> Self {
        Self {
            connector,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn network_id(&self) -> Option<NetworkId> {
        self.network_id
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Mark the connection live on `network_id`
    pub fn connect(&mut self, network_id: NetworkId) {
        info!("Connected through {} to {}", self.connector, network_id);
        self.active = true;
        self.network_id = Some(network_id);
        self.error = None;
    }

    pub fn disconnect(&mut self) {
        info!("Disconnected from {}", self.connector);
        self.active = false;
        self.account = None;
        self.network_id = None;
    }

    /// Record a connection failure; the session becomes inactive
    pub fn fail(&mut self, reason: impl ToString) {
        let reason = reason.to_string();
        error!("There was an error connecting to the network: {}", reason);
        self.active = false;
        self.error = Some(reason);
    }

    /// Switch connector. Read-only connectors drop the account.
    pub fn set_connector(&mut self, connector: Connector) {
        if connector == self.connector {
            return;
        }
        info!("Switching connector {} -> {}", self.connector, connector);
        self.connector = connector;
        if connector.is_read_only() {
            self.account = None;
        }
    }

    /// Attach or detach an account. Returns false when the connector cannot hold one.
    pub fn set_account(&mut self, account: Option<Address>) -> bool {
        if account.is_some() && self.connector.is_read_only() {
            warn!("Connector {} is read-only, ignoring account", self.connector);
            return false;
        }
        self.account = account;
        true
    }
}
