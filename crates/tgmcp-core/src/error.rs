// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

/// Abstract error kinds from spec.md §7, concretised as a Rust enum.
///
/// Every tool body returns `Result<_, CoreError>`; the tool-surface error
/// interceptor (`tgmcp_tools::registry`) is the only place that turns one of
/// these into the wire-level error record.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("platform unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    /// Stable machine-readable tag, used nowhere in the wire format directly
    /// but handy for tests and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::Unauthorized(_) => "unauthorized",
            CoreError::NotFound(_) => "not_found",
            CoreError::Unavailable(_) => "unavailable",
            CoreError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_each_variant() {
        assert_eq!(CoreError::Validation("x".into()).kind(), "validation");
        assert_eq!(CoreError::Unauthorized("x".into()).kind(), "unauthorized");
        assert_eq!(CoreError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(CoreError::Unavailable("x".into()).kind(), "unavailable");
        assert_eq!(
            CoreError::Internal(anyhow::anyhow!("boom")).kind(),
            "internal"
        );
    }

    #[test]
    fn display_includes_message() {
        let e = CoreError::NotFound("chat @x".into());
        assert_eq!(e.to_string(), "not found: chat @x");
    }
}
