//! Stock suspended operations.

mod pause;
mod sound;
mod textout;
mod wait;

pub use pause::PauseOperation;
pub use sound::{SoundTarget, WaitForSound};
pub use textout::TextoutOperation;
pub use wait::WaitOperation;
