use crate::context::Context;
use crate::operation::{EventListener, LongOperation};
use vn_core::{KeyCode, MouseButton, Result};

/// Waits for the reader to acknowledge: a left click or an advance key.
///
/// In automode the pause also ends by itself once its delay has passed.
#[derive(Debug, Clone)]
pub struct PauseOperation {
    started: u64,
    automode_ms: Option<u64>,
    acknowledged: bool,
}

impl PauseOperation {
    pub fn new(started: u64) -> Self {
        Self {
            started,
            automode_ms: None,
            acknowledged: false,
        }
    }

    pub fn with_automode(mut self, delay_ms: u64) -> Self {
        self.automode_ms = Some(delay_ms);
        self
    }

    /// A pause configured from the machine options in `ctx`.
    pub fn from_context(ctx: &Context<'_>) -> Self {
        let pause = Self::new(ctx.now());
        if ctx.options.automode {
            pause.with_automode(ctx.options.automode_ms)
        } else {
            pause
        }
    }
}

impl LongOperation for PauseOperation {
    fn name(&self) -> &str {
        "pause"
    }

    fn resume(&mut self, ctx: &mut Context<'_>) -> Result<bool> {
        if self.acknowledged {
            return Ok(true);
        }
        Ok(self
            .automode_ms
            .is_some_and(|delay| ctx.now().saturating_sub(self.started) >= delay))
    }

    fn listener(&mut self) -> Option<&mut dyn EventListener> {
        Some(self)
    }
}

impl EventListener for PauseOperation {
    fn button_state_changed(&mut self, button: MouseButton, pressed: bool) -> bool {
        if pressed && button == MouseButton::Left {
            self.acknowledged = true;
            return true;
        }
        false
    }

    fn key_state_changed(&mut self, key: KeyCode, pressed: bool) -> bool {
        if pressed && key.is_advance() {
            self.acknowledged = true;
            return true;
        }
        false
    }
}
