use crate::error::{AppError, AppResult};

/// Result of a sub-task whose failure must not abort its batch
///
/// Either the fetched value, or a substitute value along with the error that
/// caused the substitution.
#[derive(Debug)]
pub enum BestEffort<T> {
    Fetched(T),
    Defaulted { value: T, cause: AppError },
}

impl<T> BestEffort<T> {
    /// Keeps an `Ok` value, otherwise substitutes `fallback()` and logs the cause
    pub fn or_else(result: AppResult<T>, context: &str, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => BestEffort::Fetched(value),
            Err(cause) => {
                tracing::warn!(error = %cause, context = %context, "Using default after failed fetch");
                BestEffort::Defaulted {
                    value: fallback(),
                    cause,
                }
            }
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, BestEffort::Defaulted { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            BestEffort::Fetched(value) | BestEffort::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            BestEffort::Fetched(value) | BestEffort::Defaulted { value, .. } => value,
        }
    }
}

impl<T: Default> BestEffort<T> {
    /// Like [`BestEffort::or_else`] with `T::default()` as the substitute
    pub fn or_default(result: AppResult<T>, context: &str) -> Self {
        Self::or_else(result, context, T::default)
    }
}
