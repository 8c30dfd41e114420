use std::env;
use std::fs;
use std::path::Path;

use surfacefit_core::config::{redact_secret, resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl Field {
    fn new(key: &'static str, value: impl ToString, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.to_string(), env_keys }
    }
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field::new("database.url", &config.database.url, &["SURFACEFIT_DATABASE_URL"]),
        Field::new(
            "database.max_connections",
            config.database.max_connections,
            &["SURFACEFIT_DATABASE_MAX_CONNECTIONS"],
        ),
        Field::new(
            "database.timeout_secs",
            config.database.timeout_secs,
            &["SURFACEFIT_DATABASE_TIMEOUT_SECS"],
        ),
        Field::new("llm.base_url", &config.llm.base_url, &["SURFACEFIT_LLM_BASE_URL"]),
        Field::new("llm.model", &config.llm.model, &["SURFACEFIT_LLM_MODEL"]),
        Field::new(
            "llm.embedding_model",
            &config.llm.embedding_model,
            &["SURFACEFIT_LLM_EMBEDDING_MODEL"],
        ),
        Field::new("llm.temperature", config.llm.temperature, &["SURFACEFIT_LLM_TEMPERATURE"]),
        Field::new("llm.timeout_secs", config.llm.timeout_secs, &["SURFACEFIT_LLM_TIMEOUT_SECS"]),
        Field::new(
            "llm.api_key",
            redact_secret(config.llm.api_key.as_ref()),
            &["SURFACEFIT_LLM_API_KEY"],
        ),
        Field::new(
            "agent.max_tool_calls",
            config.agent.max_tool_calls,
            &["SURFACEFIT_AGENT_MAX_TOOL_CALLS"],
        ),
        Field::new(
            "agent.context_top_k",
            config.agent.context_top_k,
            &["SURFACEFIT_AGENT_CONTEXT_TOP_K"],
        ),
        Field::new(
            "agent.search_default_limit",
            config.agent.search_default_limit,
            &["SURFACEFIT_AGENT_SEARCH_DEFAULT_LIMIT"],
        ),
        Field::new(
            "agent.search_max_limit",
            config.agent.search_max_limit,
            &["SURFACEFIT_AGENT_SEARCH_MAX_LIMIT"],
        ),
        Field::new("index.path", config.index.path.display(), &["SURFACEFIT_INDEX_PATH"]),
        Field::new(
            "server.bind_address",
            &config.server.bind_address,
            &["SURFACEFIT_SERVER_BIND_ADDRESS"],
        ),
        Field::new("server.port", config.server.port, &["SURFACEFIT_SERVER_PORT"]),
        Field::new(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs,
            &["SURFACEFIT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        Field::new(
            "logging.level",
            &config.logging.level,
            &["SURFACEFIT_LOGGING_LEVEL", "SURFACEFIT_LOG_LEVEL"],
        ),
        Field::new(
            "logging.format",
            format!("{:?}", config.logging.format).to_lowercase(),
            &["SURFACEFIT_LOGGING_FORMAT", "SURFACEFIT_LOG_FORMAT"],
        ),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if config_file_doc.is_some_and(|doc| contains_path(doc, key_path)) {
        let file_path = config_file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    key_path.split('.').try_fold(root, |current, key| current.get(key)).is_some()
}
