//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# gymdesk configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
#
# Secrets do not live here. Set GYMDESK_PASSWORD and OPENAI_API_KEY in the
# environment or a .env file, or put PASSWORD / OPENAI_API_KEY in
# secrets.toml next to this file.

[model]
# name = "gpt-4o"
# api_base = "https://api.openai.com/v1"
# request_timeout_secs = 60   # 5-600
# connect_timeout_secs = 10   # 1-60
# temperature = 0.7           # 0.0-2.0, unset = provider default

[chat]
# title = "Snapchat Demo"
# caption = "Terminal app for demo purposes"
# greeting = "Hello, how can I help?"
# system_prompt = """..."""

[notices]
# capacity = 16               # 1-256
# ttl_secs = 8                # 1-3600

[logging]
# level = "INFO"              # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
