mod collector;
mod process;
mod system;
pub mod signal;

pub use collector::{Collector, CollectorHandle};
