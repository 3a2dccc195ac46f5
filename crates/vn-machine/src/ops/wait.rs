use crate::context::Context;
use crate::operation::{EventListener, LongOperation};
use vn_core::{MouseButton, Result};

/// Timed wait, optionally cut short by a mouse click.
///
/// With `save_to_store` the outcome lands in the store register: `0` when
/// the time ran out, `1` for a left click, `-1` for a right click.
#[derive(Debug, Clone)]
pub struct WaitOperation {
    started: u64,
    duration: u64,
    interruptible: bool,
    save_to_store: bool,
    clicked: Option<i32>,
}

impl WaitOperation {
    pub fn new(started: u64, duration: u64) -> Self {
        Self {
            started,
            duration,
            interruptible: false,
            save_to_store: false,
            clicked: None,
        }
    }

    pub fn interruptible(mut self) -> Self {
        self.interruptible = true;
        self
    }

    pub fn saving_to_store(mut self) -> Self {
        self.save_to_store = true;
        self
    }
}

impl LongOperation for WaitOperation {
    fn name(&self) -> &str {
        "wait"
    }

    fn resume(&mut self, ctx: &mut Context<'_>) -> Result<bool> {
        let outcome = match self.clicked {
            Some(button) => button,
            None if ctx.now().saturating_sub(self.started) >= self.duration => 0,
            None => return Ok(false),
        };
        if self.save_to_store {
            ctx.memory.set_store(outcome);
        }
        Ok(true)
    }

    fn listener(&mut self) -> Option<&mut dyn EventListener> {
        Some(self)
    }
}

impl EventListener for WaitOperation {
    fn button_state_changed(&mut self, button: MouseButton, pressed: bool) -> bool {
        if !self.interruptible || !pressed || self.clicked.is_some() {
            return false;
        }
        self.clicked = match button {
            MouseButton::Left => Some(1),
            MouseButton::Right => Some(-1),
            _ => return false,
        };
        true
    }
}
