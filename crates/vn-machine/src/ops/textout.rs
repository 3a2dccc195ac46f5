use crate::context::Context;
use crate::operation::{CompletionHook, EventListener, LongOperation};
use crate::ops::PauseOperation;
use vn_core::{KeyCode, MouseButton, Result};

/// Reveals a string one character at a time.
///
/// When the page runs out of room it pushes a pause that clears the page on
/// completion, then carries on with the character that did not fit.
#[derive(Debug, Clone)]
pub struct TextoutOperation {
    chars: Vec<char>,
    position: usize,
    speed_ms: u64,
    next_due: u64,
    reveal_all: bool,
    restart_clock: bool,
}

impl TextoutOperation {
    pub fn new(started: u64, text: &str, speed_ms: u64) -> Self {
        Self {
            chars: text.chars().collect(),
            position: 0,
            speed_ms,
            next_due: started,
            reveal_all: false,
            restart_clock: false,
        }
    }

    pub fn from_context(ctx: &Context<'_>, text: &str) -> Self {
        Self::new(ctx.now(), text, ctx.options.message_speed_ms)
    }

    pub fn revealed(&self) -> usize {
        self.position
    }
}

impl LongOperation for TextoutOperation {
    fn name(&self) -> &str {
        "textout"
    }

    fn resume(&mut self, ctx: &mut Context<'_>) -> Result<bool> {
        if self.restart_clock {
            self.next_due = ctx.now();
            self.restart_clock = false;
        }
        while let Some(&ch) = self.chars.get(self.position) {
            let instant = self.reveal_all || self.speed_ms == 0;
            if !instant && ctx.now() < self.next_due {
                return Ok(false);
            }
            if ch == '\n' {
                ctx.system.text.hard_break()?;
            } else if !ctx.system.text.display_char(ch)? {
                let pause = PauseOperation::from_context(ctx);
                ctx.push_with_hook(pause, CompletionHook::NewPage);
                self.restart_clock = true;
                return Ok(false);
            }
            self.position += 1;
            if !instant {
                self.next_due += self.speed_ms;
            }
        }
        Ok(true)
    }

    fn listener(&mut self) -> Option<&mut dyn EventListener> {
        Some(self)
    }
}

impl EventListener for TextoutOperation {
    fn button_state_changed(&mut self, button: MouseButton, pressed: bool) -> bool {
        if pressed && button == MouseButton::Left {
            self.reveal_all = true;
            return true;
        }
        false
    }

    fn key_state_changed(&mut self, key: KeyCode, pressed: bool) -> bool {
        if pressed && key.is_advance() {
            self.reveal_all = true;
            return true;
        }
        false
    }
}
