//! Result extension trait for logging errors with context.
//!
//! Used on best-effort paths where an error is logged and then either
//! propagated unchanged or deliberately dropped, e.g. a rollback that fails
//! after the workflow has already failed.

use std::fmt::Display;
use tracing::error;

/// Extension trait for logging errors with context.
pub trait ResultExt<T, E> {
    /// Log the error with context and caller location if this is an `Err`.
    ///
    /// Returns the original `Result` unchanged.
    ///
    /// ```ignore
    /// use gym_console::result_ext::ResultExt;
    ///
    /// let _ = uow.rollback().await.log("rolling back purchase_membership");
    /// ```
    fn log<S: ToString>(self, context: S) -> Result<T, E>;
}

impl<T, E: Display> ResultExt<T, E> for Result<T, E> {
    #[track_caller]
    fn log<S: ToString>(self, context: S) -> Result<T, E> {
        if let Err(ref e) = self {
            let caller_location = std::panic::Location::caller();
            error!(
                target: "gym_console",
                error = %e,
                file = %format!("{}:{}", caller_location.file(), caller_location.line()),
                context = %context.to_string(),
                "Operation failed"
            );
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_ext_ok() {
        let result: Result<i32, &str> = Ok(42);
        let logged = result.log("test context");
        assert_eq!(logged.unwrap(), 42);
    }

    #[test]
    fn test_result_ext_err() {
        let result: Result<i32, &str> = Err("rollback failed");
        let logged = result.log("rolling back");
        assert_eq!(logged.unwrap_err(), "rollback failed");
    }
}
