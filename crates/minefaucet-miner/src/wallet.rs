//! Keyfile-backed wallet provider.
//!
//! The miner never signs anything itself; the node submits claims on the
//! address's behalf. A "wallet" here is just the address to mine for.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use minefaucet_core::{Address, FaucetError};
use minefaucet_lifecycle::{WalletProvider, WalletSession};

/// On-disk keyfile: `{ "address": "0x…" }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Keyfile {
    pub address: Address,
}

pub fn load_keyfile(path: &Path) -> anyhow::Result<Address> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading keyfile {}", path.display()))?;
    let kf: Keyfile =
        serde_json::from_str(&json).context("parsing keyfile; expected {\"address\": \"0x…\"}")?;
    Ok(kf.address)
}

/// Pick the address to mine for: `--address` wins, then the keyfile if it
/// exists. `None` starts the miner disconnected.
pub fn resolve_address(address: Option<&str>, keyfile: &Path) -> anyhow::Result<Option<Address>> {
    if let Some(a) = address {
        let addr = a
            .parse::<Address>()
            .with_context(|| format!("invalid --address {a:?}"))?;
        return Ok(Some(addr));
    }
    if keyfile.exists() {
        return load_keyfile(keyfile).map(Some);
    }
    Ok(None)
}

pub struct KeyfileWallet {
    configured: Option<Address>,
    session: WalletSession,
}

impl KeyfileWallet {
    pub fn new(configured: Option<Address>) -> Self {
        Self {
            configured,
            session: WalletSession::disconnected(),
        }
    }

    /// Switch to `address` and connect it.
    pub fn connect_to(&mut self, address: Address) -> WalletSession {
        self.configured = Some(address);
        self.session = WalletSession::connected(address);
        info!(%address, "wallet connected");
        self.session
    }
}

impl WalletProvider for KeyfileWallet {
    type Error = FaucetError;

    fn session(&self) -> WalletSession {
        self.session
    }

    fn connect(&mut self) -> Result<WalletSession, FaucetError> {
        let address = self.configured.ok_or(FaucetError::NoAddress)?;
        Ok(self.connect_to(address))
    }

    fn disconnect(&mut self) -> WalletSession {
        if self.session.connected {
            info!("wallet disconnected");
        }
        self.session = WalletSession::disconnected();
        self.session
    }
}
