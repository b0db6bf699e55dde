// src/engine/common.rs
//
// Common utilities shared across engine modules.

use crate::error::ScaleError;
#[cfg(not(feature = "fuzzing"))]
use std::any::Any;
#[cfg(not(feature = "fuzzing"))]
use tracing::error;

pub type EngineResult<T> = std::result::Result<T, ScaleError>;

#[cfg(not(feature = "fuzzing"))]
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run third-party code (codecs) and turn a panic into `InternalPanic`.
///
/// Fuzzing builds let the panic through so the fuzzer records it.
#[cfg(not(feature = "fuzzing"))]
pub fn run_with_panic_policy<T, F>(label: &'static str, f: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(label, %message, "panic caught");
            Err(ScaleError::internal_panic(format!("{label}: {message}")))
        }
    }
}

#[cfg(feature = "fuzzing")]
pub fn run_with_panic_policy<T, F>(_label: &'static str, f: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T>,
{
    f()
}
