use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Pauses complete by themselves `automode_ms` after they start.
    pub automode: bool,
    pub automode_ms: u64,
    /// Delay between revealed characters; 0 shows text at once.
    pub message_speed_ms: u64,
    /// Upper bound on instructions executed in a single tick; 0 disables it.
    pub max_instructions_per_tick: usize,
    /// Parse every instruction's parameters once before running.
    pub precompile: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            automode: vn_core::config::force_automode(),
            automode_ms: 2000,
            message_speed_ms: 20,
            max_instructions_per_tick: 10_000,
            precompile: false,
        }
    }
}
