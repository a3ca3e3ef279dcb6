//! Progress reporting for long-running searches.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use log::warn;

/// Callback receiving progress in `[0.0, 1.0]` and a status message.
pub type ProgressCallback = Arc<dyn Fn(f64, &str) + Send + Sync>;

/// Invoke a progress callback, clamping progress to `[0.0, 1.0]`.
///
/// A panic inside the callback is caught and logged; it never propagates
/// into the work being reported on.
pub fn report(callback: Option<&ProgressCallback>, progress: f64, message: &str) {
    if let Some(cb) = callback {
        let clamped = progress.clamp(0.0, 1.0);
        if catch_unwind(AssertUnwindSafe(|| cb(clamped, message))).is_err() {
            warn!("Progress callback panicked at {clamped:.2} ({message})");
        }
    }
}
