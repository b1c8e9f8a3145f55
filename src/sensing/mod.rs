//! Sensing node: button edge detection and the command server.

pub mod edge_detector;
pub mod node;
pub mod server;

pub use edge_detector::{ButtonLevel, EdgeDetector};
pub use node::SensingNode;
pub use server::CommandServer;
