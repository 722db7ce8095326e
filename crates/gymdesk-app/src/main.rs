mod cli;
mod render;
mod repl;

use std::sync::Arc;
use std::time::Duration;

use gymdesk_ai::{
    AiClient, Conversation, MemoryContacts, OpenAiClient, OpenAiConfig, Session, ToolRegistry,
};
use gymdesk_common::{ConfigError, NoticeQueue};
use gymdesk_config::{GymdeskConfig, Secrets};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::repl::Repl;

/// Install the stderr subscriber: `RUST_LOG` plus one extra directive.
fn init_logging(directive: &str) {
    let mut filter = EnvFilter::from_default_env();
    match directive.parse::<Directive>() {
        Ok(d) => filter = filter.add_directive(d),
        Err(e) => eprintln!("ignoring invalid log directive {directive:?}: {e}"),
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loaded config, or defaults on failure, with the CLI model override applied.
fn effective_config(
    loaded: Result<GymdeskConfig, ConfigError>,
    model_override: Option<String>,
) -> GymdeskConfig {
    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        GymdeskConfig::default()
    });
    if let Some(model) = model_override {
        config.model.name = model;
    }
    config
}

/// Build the model client, or `None` when no API key is configured.
fn build_client(config: &GymdeskConfig, api_key: Option<&str>) -> Option<Arc<dyn AiClient>> {
    let Some(key) = api_key else {
        tracing::warn!("OPENAI_API_KEY is not set; chat turns will fail until it is configured");
        return None;
    };

    let model = &config.model;
    let openai = OpenAiConfig::new(key)
        .with_model(&model.name)
        .with_api_base(&model.api_base)
        .with_temperature(model.temperature)
        .with_timeouts(
            Duration::from_secs(model.connect_timeout_secs.into()),
            Duration::from_secs(model.request_timeout_secs.into()),
        );

    match OpenAiClient::new(openai) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::error!("Failed to create model client: {e}");
            None
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let args = cli::parse();

    // Config is read before logging starts so its level can apply
    let loaded = gymdesk_config::load_config(args.config.as_deref());
    let directive = args.log_level.clone().unwrap_or_else(|| {
        loaded
            .as_ref()
            .map(|c| c.logging.level)
            .unwrap_or_default()
            .directive()
            .to_string()
    });
    init_logging(&directive);

    tracing::info!("gymdesk v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = effective_config(loaded, args.model);
    if args.print_config {
        println!("{}", gymdesk_config::config_to_json(&config));
        return;
    }
    tracing::info!(model = %config.model.name, "Config loaded");

    let secrets = Secrets::load();
    if secrets.password.is_none() {
        tracing::warn!("No access password configured");
    }

    let contacts = Arc::new(MemoryContacts::new());
    let call_timeout = Duration::from_secs(
        u64::from(config.model.request_timeout_secs) + u64::from(config.model.connect_timeout_secs),
    );
    let conversation = Conversation::new(
        build_client(&config, secrets.api_key.as_deref()),
        ToolRegistry::new(contacts.clone()),
    )
    .with_call_timeout(call_timeout);

    let session = Session::new().with_notices(NoticeQueue::new(
        config.notices.capacity as usize,
        Duration::from_secs(config.notices.ttl_secs.into()),
    ));

    let mut repl = Repl::new(
        tokio::io::BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        conversation,
        session,
        config.chat,
        secrets.password,
    )
    .with_interrupts(repl::ctrl_c_interrupts());

    let outcome = repl.run().await;
    tracing::info!(
        stored_usernames = contacts.usernames().len(),
        "Shutdown complete"
    );
    if let Err(e) = outcome {
        tracing::error!("gymdesk exited with error: {e}");
        std::process::exit(1);
    }
}
