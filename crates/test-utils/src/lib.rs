//! This crate provides test-utilities for exercising the signing provider
//! without a live hub, notification transport, or Ethereum node.

pub mod hub;
pub mod node;
pub mod wire;

/// A checksummed address (an EIP-55 reference vector) usable as the `from`
/// field in test configs.
pub const TEST_FROM_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
