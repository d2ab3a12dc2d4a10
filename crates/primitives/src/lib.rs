//! This crate contains the wire types and pure functions shared across the
//! workspace.
//!
//! It lies at the bottom of the crate-hierarchy in this workspace i.e., it
//! does not depend on any other crate in this workspace.

pub mod address;
pub mod context;
pub mod hub;
pub mod rpc;
