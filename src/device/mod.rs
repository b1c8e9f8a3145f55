//! Pin access abstraction: exclusive line claims and the two pin groups the
//! nodes drive.

pub mod claims;
pub mod pins;
pub mod traits;

pub use claims::{pin_number, ClaimRegistry, LineClaim};
pub use pins::{IndicatorPair, PushButton};
pub use traits::{DigitalInputPin, DigitalOutputPin, LineProvider};
