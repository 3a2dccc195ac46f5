//! Cooperative script machine: fetches instructions, decodes their
//! parameters against live memory, and keeps a stack of suspended
//! operations that are resumed once per frame.

pub mod builtins;
pub mod context;
pub mod error;
pub mod machine;
pub mod memory;
pub mod operation;
pub mod ops;
pub mod options;
pub mod registry;
pub mod stack;
pub mod system;

pub use context::Context;
pub use error::MachineError;
pub use machine::{Machine, MachineState, StepOutcome};
pub use memory::{Memory, BANK_SIZE};
pub use operation::{CompletionHook, EventListener, LongOperation, StackEntry};
pub use options::MachineOptions;
pub use registry::{OpcodeEntry, OpcodeRegistry};
pub use stack::{EntryState, OperationStack};
pub use system::{
    Collaborators, Graphics, Headless, HeadlessGraphics, HeadlessSound, HeadlessText,
    SoundStatus, TextPage,
};
