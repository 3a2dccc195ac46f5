use crate::context::Context;
use crate::operation::StackEntry;
use vn_core::{InputEvent, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Top of the stack; receives ticks and events.
    Active,
    /// Below the top; frozen until everything above it is gone.
    Dormant,
}

/// What happened to the top entry during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickResult {
    Idle,
    Pending,
    Completed { name: String },
}

#[derive(Debug, Default)]
pub struct OperationStack {
    entries: Vec<StackEntry>,
}

impl OperationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: StackEntry) {
        vn_core::debug!("suspending on {}", entry.name());
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_name(&self) -> Option<&str> {
        self.entries.last().map(StackEntry::name)
    }

    /// Entry states from bottom to top.
    pub fn states(&self) -> Vec<EntryState> {
        let top = self.entries.len().saturating_sub(1);
        (0..self.entries.len())
            .map(|index| {
                if index == top {
                    EntryState::Active
                } else {
                    EntryState::Dormant
                }
            })
            .collect()
    }

    /// Resume the top entry once. A finished entry fires its hook and is
    /// removed; operations pushed meanwhile land on top afterwards. When the
    /// resume or the hook fails, those pushes are dropped with the error.
    pub fn tick(&mut self, ctx: &mut Context<'_>) -> Result<TickResult> {
        let outcome = self.resume_top(ctx);
        let pushed = ctx.take_pushed();
        match outcome {
            Ok(result) => {
                for entry in pushed {
                    self.push(entry);
                }
                Ok(result)
            }
            Err(err) => {
                if !pushed.is_empty() {
                    vn_core::debug!(
                        "dropping {} pushed operations after error: {}",
                        pushed.len(),
                        err
                    );
                }
                Err(err)
            }
        }
    }

    fn resume_top(&mut self, ctx: &mut Context<'_>) -> Result<TickResult> {
        let Some(top) = self.entries.last_mut() else {
            return Ok(TickResult::Idle);
        };
        if !top.operation.resume(ctx)? {
            return Ok(TickResult::Pending);
        }
        let Some(entry) = self.entries.pop() else {
            return Ok(TickResult::Idle);
        };
        let name = entry.name().to_string();
        vn_core::debug!("{} completed", name);
        if let Some(hook) = entry.hook {
            hook.fire(ctx)?;
        }
        Ok(TickResult::Completed { name })
    }

    /// Deliver an event to the top entry only. Unconsumed events are dropped.
    pub fn dispatch_event(&mut self, event: &InputEvent) -> bool {
        let Some(top) = self.entries.last_mut() else {
            return false;
        };
        let Some(listener) = top.operation.listener() else {
            return false;
        };
        match *event {
            InputEvent::PointerMoved(position) => listener.pointer_moved(position),
            InputEvent::ButtonStateChanged { button, pressed } => {
                listener.button_state_changed(button, pressed)
            }
            InputEvent::KeyStateChanged { key, pressed } => listener.key_state_changed(key, pressed),
        }
    }

    /// Remove the top entry without running its hook.
    pub fn discard_top(&mut self) -> Option<StackEntry> {
        let entry = self.entries.pop();
        if let Some(entry) = &entry {
            vn_core::debug!("discarding {}", entry.name());
        }
        entry
    }

    /// Remove every entry without running any hook.
    pub fn discard_all(&mut self) -> usize {
        let count = self.entries.len();
        if count > 0 {
            vn_core::debug!("discarding {} suspended operations", count);
        }
        self.entries.clear();
        count
    }
}
