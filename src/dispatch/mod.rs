//! Validator-side fan-out of a round's query to the sampled miners.

mod client;
mod error;
mod registry;
mod round;


#[cfg(any(test, feature = "mock"))]
pub use client::{MockBehaviour, ScriptedDispatchClient};
pub use client::{DispatchClient, HttpDispatchClient};
pub use error::DispatchError;
pub use registry::{MinerEndpoint, MinerRegistry};
pub use round::{DispatchTimeouts, dispatch_round};
