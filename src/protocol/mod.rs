//! Wire protocol: 2-character ASCII commands over a raw TCP stream.

pub mod codec;
pub mod framer;

pub use codec::{decode, encode, LogicalState, WireCommand};
pub use framer::CommandFramer;
