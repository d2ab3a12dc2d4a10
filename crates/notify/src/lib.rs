//! # `hub-notify`
//!
//! `hub-notify` delivers the signing hub's pub/sub notifications to
//! in-process subscribers. A router task consumes a wire stream of
//! [`event::ChannelEvent`]s and fans each one out to the
//! [`subscription::Subscription`]s registered for its channel and event kind.
//!
//! The wire stream itself is supplied by the caller, so the crate stays
//! agnostic of the concrete socket transport.

pub mod client;
mod errors;
pub mod event;
pub mod subscription;

pub use errors::NotifyError;
