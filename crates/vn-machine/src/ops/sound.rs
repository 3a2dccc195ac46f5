use crate::context::Context;
use crate::operation::{EventListener, LongOperation};
use vn_core::{MouseButton, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundTarget {
    Bgm,
    Wav(i32),
}

/// Polls the sound capability until the target stops playing.
#[derive(Debug, Clone)]
pub struct WaitForSound {
    target: SoundTarget,
    interruptible: bool,
    interrupted: bool,
}

impl WaitForSound {
    pub fn new(target: SoundTarget) -> Self {
        Self {
            target,
            interruptible: false,
            interrupted: false,
        }
    }

    pub fn interruptible(mut self) -> Self {
        self.interruptible = true;
        self
    }
}

impl LongOperation for WaitForSound {
    fn name(&self) -> &str {
        match self.target {
            SoundTarget::Bgm => "bgm_wait",
            SoundTarget::Wav(_) => "wav_wait",
        }
    }

    fn resume(&mut self, ctx: &mut Context<'_>) -> Result<bool> {
        if self.interrupted {
            return Ok(true);
        }
        let playing = match self.target {
            SoundTarget::Bgm => ctx.system.sound.bgm_playing(),
            SoundTarget::Wav(channel) => ctx.system.sound.wav_playing(channel),
        };
        Ok(!playing)
    }

    fn listener(&mut self) -> Option<&mut dyn EventListener> {
        Some(self)
    }
}

impl EventListener for WaitForSound {
    fn button_state_changed(&mut self, button: MouseButton, pressed: bool) -> bool {
        if self.interruptible && pressed && button == MouseButton::Left {
            self.interrupted = true;
            return true;
        }
        false
    }
}
