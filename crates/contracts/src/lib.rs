//! Contract bindings for the MetaMoney market
//!
//! Features:
//! - Binding traits the aggregator is written against
//! - `sol!` interfaces of the money market and ERC-20 tokens
//! - JSON-RPC implementation on an alloy HTTP provider

pub mod abi;
pub mod bindings;
pub mod provider;

pub use bindings::{Contracts, Erc20, MoneyMarket};
pub use provider::{bind, http_provider, network_id, HttpProvider, RpcErc20, RpcMoneyMarket};
