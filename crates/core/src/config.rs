use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "surfacefit.toml";
pub const ENV_PREFIX: &str = "SURFACEFIT_";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub index: IndexConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub api_key: Option<SecretString>,
}

/// Limits for the tool-calling loop and the context builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    pub max_tool_calls: u32,
    pub context_top_k: usize,
    pub search_default_limit: usize,
    pub search_max_limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub index_path: Option<PathBuf>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://surfacefit.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                base_url: "http://127.0.0.1:11434".to_string(),
                model: "llama3.1".to_string(),
                embedding_model: "nomic-embed-text".to_string(),
                temperature: 0.2,
                timeout_secs: 120,
                api_key: None,
            },
            agent: AgentConfig::default(),
            index: IndexConfig { path: PathBuf::from("data/product_embeddings.json") },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_tool_calls: 3, context_top_k: 3, search_default_limit: 5, search_max_limit: 25 }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(embedding_model) = llm.embedding_model {
                self.llm.embedding_model = embedding_model;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(api_key) = llm.api_key {
                self.llm.api_key = Some(api_key.into()); // ubs:ignore
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(max_tool_calls) = agent.max_tool_calls {
                self.agent.max_tool_calls = max_tool_calls;
            }
            if let Some(context_top_k) = agent.context_top_k {
                self.agent.context_top_k = context_top_k;
            }
            if let Some(search_default_limit) = agent.search_default_limit {
                self.agent.search_default_limit = search_default_limit;
            }
            if let Some(search_max_limit) = agent.search_max_limit {
                self.agent.search_max_limit = search_max_limit;
            }
        }

        if let Some(path) = patch.index.and_then(|index| index.path) {
            self.index.path = path;
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SURFACEFIT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SURFACEFIT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("SURFACEFIT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SURFACEFIT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("SURFACEFIT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SURFACEFIT_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("SURFACEFIT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("SURFACEFIT_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = value;
        }
        if let Some(value) = read_env("SURFACEFIT_LLM_TEMPERATURE") {
            self.llm.temperature = parse_env("SURFACEFIT_LLM_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("SURFACEFIT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_env("SURFACEFIT_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("SURFACEFIT_LLM_API_KEY") {
            self.llm.api_key = Some(value.into()); // ubs:ignore
        }

        if let Some(value) = read_env("SURFACEFIT_AGENT_MAX_TOOL_CALLS") {
            self.agent.max_tool_calls = parse_env("SURFACEFIT_AGENT_MAX_TOOL_CALLS", &value)?;
        }
        if let Some(value) = read_env("SURFACEFIT_AGENT_CONTEXT_TOP_K") {
            self.agent.context_top_k = parse_env("SURFACEFIT_AGENT_CONTEXT_TOP_K", &value)?;
        }
        if let Some(value) = read_env("SURFACEFIT_AGENT_SEARCH_DEFAULT_LIMIT") {
            self.agent.search_default_limit =
                parse_env("SURFACEFIT_AGENT_SEARCH_DEFAULT_LIMIT", &value)?;
        }
        if let Some(value) = read_env("SURFACEFIT_AGENT_SEARCH_MAX_LIMIT") {
            self.agent.search_max_limit = parse_env("SURFACEFIT_AGENT_SEARCH_MAX_LIMIT", &value)?;
        }

        if let Some(value) = read_env("SURFACEFIT_INDEX_PATH") {
            self.index.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("SURFACEFIT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SURFACEFIT_SERVER_PORT") {
            self.server.port = parse_env("SURFACEFIT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SURFACEFIT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_env("SURFACEFIT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("SURFACEFIT_LOGGING_LEVEL").or_else(|| read_env("SURFACEFIT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SURFACEFIT_LOGGING_FORMAT").or_else(|| read_env("SURFACEFIT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(base_url) = overrides.llm_base_url {
            self.llm.base_url = base_url;
        }
        if let Some(model) = overrides.llm_model {
            self.llm.model = model;
        }
        if let Some(index_path) = overrides.index_path {
            self.index.path = index_path;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_llm(&self.llm)?;
        validate_agent(&self.agent)?;
        validate_index(&self.index)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Masks a secret for operator output, keeping a short prefix when the value
/// is long enough that the prefix does not give it away.
pub fn redact_secret(secret: Option<&SecretString>) -> String {
    match secret.map(|value| value.expose_secret()) {
        None => "<unset>".to_string(),
        Some(value) if value.trim().is_empty() => "<empty>".to_string(),
        Some(value) if value.chars().count() > 8 => {
            let prefix: String = value.chars().take(4).collect();
            format!("{prefix}…(redacted)")
        }
        Some(_) => "(redacted)".to_string(),
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    let base_url = llm.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }
    if llm.embedding_model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.embedding_model must not be empty".to_string()));
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    if llm.timeout_secs == 0 || llm.timeout_secs > 600 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=600".to_string(),
        ));
    }

    Ok(())
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    if agent.max_tool_calls == 0 {
        return Err(ConfigError::Validation(
            "agent.max_tool_calls must be greater than zero".to_string(),
        ));
    }
    if agent.context_top_k == 0 {
        return Err(ConfigError::Validation(
            "agent.context_top_k must be greater than zero".to_string(),
        ));
    }
    if agent.search_default_limit == 0 || agent.search_default_limit > agent.search_max_limit {
        return Err(ConfigError::Validation(
            "agent.search_default_limit must be in range 1..=agent.search_max_limit".to_string(),
        ));
    }
    Ok(())
}

fn validate_index(index: &IndexConfig) -> Result<(), ConfigError> {
    if index.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("index.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation(
            "server.bind_address must not be empty".to_string(),
        ));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    llm: Option<LlmPatch>,
    agent: Option<AgentPatch>,
    index: Option<IndexPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    base_url: Option<String>,
    model: Option<String>,
    embedding_model: Option<String>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    max_tool_calls: Option<u32>,
    context_top_k: Option<usize>,
    search_default_limit: Option<usize>,
    search_max_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
// ubs:ignore
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use secrecy::{ExposeSecret, SecretString};
    use tempfile::TempDir;

    use super::{redact_secret, AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_without_any_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("does-not-exist.toml")),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.agent.max_tool_calls == 3, "default tool budget should be 3")?;
        ensure(config.agent.context_top_k == 3, "default context top_k should be 3")?;
        ensure(config.agent.search_default_limit == 5, "default search limit should be 5")?;
        ensure(config.agent.search_max_limit == 25, "search limit cap should be 25")?;
        ensure(
            config.index.path == PathBuf::from("data/product_embeddings.json"),
            "default index path should point at data/",
        )?;
        ensure(config.llm.api_key.is_none(), "api key should be unset by default")
    }

    #[test]
    fn missing_required_file_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("missing/surfacefit.toml")),
            require_file: true,
            ..LoadOptions::default()
        });
        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "required missing file should fail with MissingConfigFile",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SURFACEFIT_LLM_KEY", "key-from-env");
        env::set_var("TEST_SURFACEFIT_MODEL", "mistral");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("surfacefit.toml");
            fs::write(
                &path,
                r#"
[llm]
model = "${TEST_SURFACEFIT_MODEL}"
api_key = "${TEST_SURFACEFIT_LLM_KEY}" # ubs:ignore

[agent]
max_tool_calls = 5

[index]
path = "var/index.json"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.llm.model == "mistral", "model should be interpolated from env")?;
            ensure(
                config.llm.api_key.as_ref().map(|key| key.expose_secret() == "key-from-env")
                    == Some(true),
                "api key should be interpolated from env",
            )?;
            ensure(config.agent.max_tool_calls == 5, "agent budget should come from file")?;
            ensure(
                config.index.path == PathBuf::from("var/index.json"),
                "index path should come from file",
            )
        })();

        clear_vars(&["TEST_SURFACEFIT_LLM_KEY", "TEST_SURFACEFIT_MODEL"]);
        result
    }

    #[test]
    fn unterminated_interpolation_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("surfacefit.toml");
        fs::write(&path, "[llm]\nmodel = \"${OPEN\"\n").map_err(|err| err.to_string())?;

        let result =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(result, Err(ConfigError::UnterminatedInterpolation)),
            "unterminated ${ should be rejected",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SURFACEFIT_LOG_LEVEL", "warn");
        env::set_var("SURFACEFIT_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["SURFACEFIT_LOG_LEVEL", "SURFACEFIT_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SURFACEFIT_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("SURFACEFIT_LLM_MODEL", "from-env-model");
        env::set_var("SURFACEFIT_AGENT_CONTEXT_TOP_K", "4");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("surfacefit.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[llm]
model = "from-file-model"
temperature = 0.7

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.llm.model == "from-env-model", "env model should win over file")?;
            ensure(
                (config.llm.temperature - 0.7).abs() < f32::EPSILON,
                "file temperature should win over default",
            )?;
            ensure(config.agent.context_top_k == 4, "env top_k should win over default")
        })();

        clear_vars(&[
            "SURFACEFIT_DATABASE_URL",
            "SURFACEFIT_LLM_MODEL",
            "SURFACEFIT_AGENT_CONTEXT_TOP_K",
        ]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SURFACEFIT_AGENT_MAX_TOOL_CALLS", "many");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["SURFACEFIT_AGENT_MAX_TOOL_CALLS"]);

        ensure(
            matches!(
                result,
                Err(ConfigError::InvalidEnvOverride { ref key, .. })
                    if key == "SURFACEFIT_AGENT_MAX_TOOL_CALLS"
            ),
            "non-numeric budget should be an invalid env override",
        )
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SURFACEFIT_LLM_TEMPERATURE", "3.5");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("llm.temperature")
            );
            ensure(has_message, "validation failure should mention llm.temperature")
        })();

        clear_vars(&["SURFACEFIT_LLM_TEMPERATURE"]);
        result
    }

    #[test]
    fn zero_tool_budget_is_rejected() -> Result<(), String> {
        let mut config = AppConfig::default();
        config.agent.max_tool_calls = 0;

        ensure(
            matches!(
                config.validate(),
                Err(ConfigError::Validation(ref message)) if message.contains("agent.max_tool_calls")
            ),
            "a zero tool budget should fail validation",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SURFACEFIT_LLM_API_KEY", "sk-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("sk-secret-value"), "debug output should not contain api key")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )
        })();

        clear_vars(&["SURFACEFIT_LLM_API_KEY"]);
        result
    }

    #[test]
    fn redaction_keeps_only_a_short_prefix() -> Result<(), String> {
        let long: SecretString = "sk-abcdefghijkl".to_string().into();
        let short: SecretString = "abc".to_string().into();

        ensure(redact_secret(None) == "<unset>", "missing secret should render as unset")?;
        ensure(redact_secret(Some(&short)) == "(redacted)", "short secret should be fully hidden")?;
        let rendered = redact_secret(Some(&long));
        ensure(rendered.starts_with("sk-a"), "long secret should keep a four char prefix")?;
        ensure(!rendered.contains("ijkl"), "long secret tail should be hidden")
    }
}
