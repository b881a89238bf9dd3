//! minefaucet-rpc
//!
//! JSON-RPC 2.0 client for the faucet node.
//!
//! Namespace: "faucet"
//! Methods:
//!   faucet_getClaimRecord: per-wallet claim record (or null)
//!   faucet_claim         : broadcast a claim; returns the tx hash
//!   faucet_getReceipt    : settlement of a claim (null while pending)
//!   faucet_getInfo       : reward, cap and session parameters

pub mod client;
pub mod types;

pub use client::{FaucetRpcClient, RpcClientConfig, WireError};
pub use types::{RpcClaimRecord, RpcFaucetInfo, RpcReceipt};
