//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod misc;
mod model;


use crate::schema::GymdeskConfig;
use gymdesk_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &GymdeskConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    model::validate_model(&mut errors, config);
    misc::validate_chat(&mut errors, config);
    misc::validate_notices(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
