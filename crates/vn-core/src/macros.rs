/// Return early with a malformed-parameter error
#[macro_export]
macro_rules! malformed_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::Error::malformed(format!($($arg)*)))
    };
}

/// Ensure a condition holds, or return a malformed-parameter error
#[macro_export]
macro_rules! malformed_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::malformed_bail!($($arg)*);
        }
    };
}

/// Return early with an evaluation error
#[macro_export]
macro_rules! eval_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::Error::evaluation(format!($($arg)*)))
    };
}

/// Log a debug message
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}

/// Log a trace message
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::tracing::trace!($($arg)*)
    };
}
