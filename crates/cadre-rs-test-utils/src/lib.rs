//! Test helpers shared across Cadre crates.

pub mod completion;
pub mod events;

pub use completion::{
    FailingCompletion, FixedCompletion, RecordingCompletion, ScriptedCompletion,
};
pub use events::CapturingSink;
