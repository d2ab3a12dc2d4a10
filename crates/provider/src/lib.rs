//! # `hub-sign-provider`
//!
//! A JSON-RPC request interceptor that sits between a web3 client library and
//! an Ethereum node. Most RPC methods are forwarded unchanged to a configured
//! node endpoint; the ones that require the signer's key material
//! (`eth_sendTransaction`, `eth_sign`) are redirected to the signing hub,
//! where a human approves the transaction. The provider then waits, possibly
//! for minutes, for the hub's completion notification and resolves the
//! original call with the resulting transaction hash.
//!
//! The entry point is [`provider::HubSignProvider`]; the asynchronous
//! completion-correlation engine lives in [`correlator::TxCorrelator`].

pub mod config;
pub mod constants;
pub mod correlator;
pub mod errors;
pub mod events;
pub mod provider;

pub use config::ProviderConfig;
pub use provider::HubSignProvider;
