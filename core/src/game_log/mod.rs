//! Game log parsing: envelope splitting, noise filtering and classification.

pub mod line;
pub mod parser;
pub mod reader;
pub mod registry;


pub use line::{DecodeError, GoalScoredEvent, MessageKind, ParsedLine, Payload, PayloadShape};
pub use parser::{LineParser, Rejection};
pub use reader::{
    LogSnapshot, TailError, TailPosition, find_log_end, read_full_log_file, read_log_file,
    tail_log_file,
};
pub use registry::{ClassifierEntry, Classification, Decoder, Registry, RegistryError};
