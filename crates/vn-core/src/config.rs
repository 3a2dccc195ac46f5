use std::sync::OnceLock;

fn env_true(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|val| {
        let trimmed = val.trim();
        !trimmed.is_empty() && !matches!(trimmed, "0" | "false" | "FALSE" | "False")
    })
}

fn bool_from_env(key: &str) -> bool {
    env_true(key).unwrap_or(false)
}

/// `VN_AUTOMODE`: pauses complete on their own after the automode delay.
pub fn force_automode() -> bool {
    static AUTOMODE: OnceLock<bool> = OnceLock::new();
    *AUTOMODE.get_or_init(|| bool_from_env("VN_AUTOMODE"))
}

/// `VN_TRACE_PARAMS`: log every decoded parameter list.
pub fn trace_params() -> bool {
    static TRACE: OnceLock<bool> = OnceLock::new();
    *TRACE.get_or_init(|| bool_from_env("VN_TRACE_PARAMS"))
}
