//! Actuation node: the command client and its reconnect policy.

pub mod backoff;
pub mod client;
pub mod node;

pub use client::{CommandClient, SessionEnd};
pub use node::run;
