//! Turns classified log lines into match state changes and higher-level
//! [`GameSignal`]s for observers.

mod handler;
mod processor;
mod signal;

#[cfg(test)]
mod processor_tests;

pub use handler::SignalHandler;
pub use processor::{EventProcessor, ProcessorStats};
pub use signal::GameSignal;
