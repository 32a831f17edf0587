//! Logging initialization module

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Bare registry; tests install their own capture layer
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call has any effect. `RUST_LOG` overrides the profile's
/// default filter.
///
/// - **Development**: human-readable logs, `modeldelta=debug`
/// - **Production**: JSON structured logs, `modeldelta=info`
/// - **Test**: registry only
///
/// A subscriber installed by someone else (e.g. the host application) is left
/// in place.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let result = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(default_filter("modeldelta=debug"))
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(default_filter("modeldelta=info"))
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        if result.is_err() {
            tracing::debug!(?profile, "global subscriber already installed");
        }
    });
}

fn default_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}
