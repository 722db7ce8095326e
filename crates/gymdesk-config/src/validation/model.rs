//! Validation for the `[model]` section.

use crate::schema::GymdeskConfig;

use super::helpers::{validate_non_empty, validate_range, validate_range_f64};

pub(crate) fn validate_model(errors: &mut Vec<String>, config: &GymdeskConfig) {
    let model = &config.model;

    validate_non_empty(errors, "model.name", &model.name);

    if !(model.api_base.starts_with("https://") || model.api_base.starts_with("http://")) {
        errors.push(format!(
            "model.api_base = {:?} must be an http(s) URL",
            model.api_base
        ));
    }

    validate_range(
        errors,
        "model.request_timeout_secs",
        model.request_timeout_secs,
        5,
        600,
    );
    validate_range(
        errors,
        "model.connect_timeout_secs",
        model.connect_timeout_secs,
        1,
        60,
    );

    if let Some(t) = model.temperature {
        validate_range_f64(errors, "model.temperature", t, 0.0, 2.0);
    }
}
