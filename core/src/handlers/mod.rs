pub mod signal_logger;

pub use signal_logger::SignalLogger;
