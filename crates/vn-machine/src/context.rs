use crate::memory::Memory;
use crate::operation::{CompletionHook, LongOperation, StackEntry};
use crate::options::MachineOptions;
use crate::system::Collaborators;

/// Everything a handler, operation or completion hook may touch.
///
/// Operations pushed through the context are placed on the stack once the
/// current callback returns.
pub struct Context<'a> {
    now: u64,
    pub memory: &'a mut Memory,
    pub system: &'a mut Collaborators,
    pub options: &'a MachineOptions,
    pushed: Vec<StackEntry>,
    halted: bool,
}

impl<'a> Context<'a> {
    pub fn new(
        now: u64,
        memory: &'a mut Memory,
        system: &'a mut Collaborators,
        options: &'a MachineOptions,
    ) -> Self {
        Self {
            now,
            memory,
            system,
            options,
            pushed: Vec::new(),
            halted: false,
        }
    }

    /// Milliseconds accumulated from ticks since the machine started.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn push(&mut self, operation: impl LongOperation + 'static) {
        self.pushed.push(StackEntry::new(Box::new(operation)));
    }

    pub fn push_with_hook(&mut self, operation: impl LongOperation + 'static, hook: CompletionHook) {
        self.pushed
            .push(StackEntry::new(Box::new(operation)).with_hook(hook));
    }

    pub fn push_entry(&mut self, entry: StackEntry) {
        self.pushed.push(entry);
    }

    pub fn has_pushed(&self) -> bool {
        !self.pushed.is_empty()
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn take_pushed(&mut self) -> Vec<StackEntry> {
        std::mem::take(&mut self.pushed)
    }
}
