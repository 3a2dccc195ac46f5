use crate::context::Context;
use std::fmt::{Debug, Formatter};
use vn_core::{KeyCode, MouseButton, Point, Result};

/// An opcode whose effect spans several frames.
pub trait LongOperation {
    fn name(&self) -> &str;

    /// Called once per tick while this operation is on top of the stack.
    /// Returns `true` when it has finished.
    fn resume(&mut self, ctx: &mut Context<'_>) -> Result<bool>;

    /// Input capability, if the operation reacts to events.
    fn listener(&mut self) -> Option<&mut dyn EventListener> {
        None
    }
}

/// Input callbacks. Each returns whether the event was consumed.
pub trait EventListener {
    fn pointer_moved(&mut self, _position: Point) -> bool {
        false
    }

    fn button_state_changed(&mut self, _button: MouseButton, _pressed: bool) -> bool {
        false
    }

    fn key_state_changed(&mut self, _key: KeyCode, _pressed: bool) -> bool {
        false
    }
}

/// One-shot effect run when an operation finishes on its own.
pub enum CompletionHook {
    NewPage,
    HardBreak,
    Callback(Box<dyn FnOnce(&mut Context<'_>) -> Result<()>>),
}

impl CompletionHook {
    pub fn callback(f: impl FnOnce(&mut Context<'_>) -> Result<()> + 'static) -> Self {
        CompletionHook::Callback(Box::new(f))
    }

    pub fn fire(self, ctx: &mut Context<'_>) -> Result<()> {
        match self {
            CompletionHook::NewPage => ctx.system.text.new_page(),
            CompletionHook::HardBreak => ctx.system.text.hard_break(),
            CompletionHook::Callback(f) => f(ctx),
        }
    }
}

impl Debug for CompletionHook {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionHook::NewPage => write!(f, "NewPage"),
            CompletionHook::HardBreak => write!(f, "HardBreak"),
            CompletionHook::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

pub struct StackEntry {
    pub operation: Box<dyn LongOperation>,
    pub hook: Option<CompletionHook>,
}

impl StackEntry {
    pub fn new(operation: Box<dyn LongOperation>) -> Self {
        Self {
            operation,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: CompletionHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        self.operation.name()
    }
}

impl Debug for StackEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackEntry")
            .field("operation", &self.operation.name())
            .field("hook", &self.hook)
            .finish()
    }
}
