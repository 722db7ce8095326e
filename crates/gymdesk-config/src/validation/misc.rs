//! Validation for the smaller sections: chat copy and notices.

use crate::schema::GymdeskConfig;

use super::helpers::{validate_non_empty, validate_range};

/// The seed messages must carry text.
pub(crate) fn validate_chat(errors: &mut Vec<String>, config: &GymdeskConfig) {
    validate_non_empty(errors, "chat.system_prompt", &config.chat.system_prompt);
    validate_non_empty(errors, "chat.greeting", &config.chat.greeting);
}

pub(crate) fn validate_notices(errors: &mut Vec<String>, config: &GymdeskConfig) {
    validate_range(errors, "notices.capacity", config.notices.capacity, 1, 256);
    validate_range(errors, "notices.ttl_secs", config.notices.ttl_secs, 1, 3600);
}
