//! Uniform success/failure envelope returned by every registry operation.

use serde::Serialize;
use std::fmt::Display;

const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// `{ok: true, data}` on success, `{ok: false, error}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failure with a message; an empty message is replaced so callers
    /// always have something to show.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        Self {
            ok: false,
            data: None,
            error: Some(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            ok: self.ok,
            data: self.data.map(f),
            error: self.error,
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.ok, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self
                .error
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for Outcome<T> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}
