//! Process-wide settings consulted when explanation engines are built.

use once_cell::sync::Lazy;
use thiserror::Error;

/// Environment variable read once per process to populate
/// [`Settings::global`].
pub const EXPLANATIONS_ENV: &str = "CALABASH_EXPLANATIONS";

/// Solver-wide settings.
///
/// Explanation recording touches every domain operation, so it must be opted
/// into before any engine is constructed; constructors fail fast otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct Settings {
    /// Whether explanation-recording engines may be constructed.
    pub explanations_enabled: bool,
}

static GLOBAL: Lazy<Settings> = Lazy::new(|| Settings {
    explanations_enabled: std::env::var(EXPLANATIONS_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false),
});

impl Settings {
    /// The process-wide default, read lazily from the environment.
    pub fn global() -> &'static Settings {
        &GLOBAL
    }
}

/// Errors reported when an explanation engine is constructed, before any
/// search begins.
#[derive(Debug, Error, Clone, Copy)]
pub enum ConfigurationError {
    #[error(
        "explanations are not plugged in; enable `explanations_enabled` in the settings \
         passed to the engine, or set {EXPLANATIONS_ENV}=true, before constructing an \
         explanation engine"
    )]
    ExplanationsNotEnabled,
}
