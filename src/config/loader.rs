//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::DispatchConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<DispatchConfig, ConfigError> {
    let config: DispatchConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DispatchConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatcherType;

    const SAMPLE: &str = r#"
[listener]
bind_address = "127.0.0.1:9000"

[context.init_parameters]
app = "demo"

[[handler]]
name = "greet"
type = "static_text"
mappings = ["/hello"]
init_parameters = { body = "hi" }

[[handler]]
name = "api"
type = "echo"
mappings = ["/api", "/api/*"]
load_on_startup = 1

[[filter]]
name = "log"
type = "access_log"
url_patterns = ["/*"]

[[filter]]
name = "inc"
type = "set_headers"
handler_names = ["api"]
dispatch_types = ["include", "forward"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.context.init_parameters.get("app").map(String::as_str), Some("demo"));
        assert_eq!(config.handlers.len(), 2);
        assert_eq!(config.handlers[1].mappings, vec!["/api", "/api/*"]);
        assert_eq!(config.handlers[1].load_on_startup, Some(1));
        assert_eq!(config.filters[0].name, "log");
        assert_eq!(
            config.filters[1].dispatch_types,
            vec![DispatcherType::Include, DispatcherType::Forward]
        );
        // Defaults fill everything else.
        assert_eq!(config.limits.request_timeout_secs, 30);
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("[[handler]]\nname = 3"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error() {
        let err = parse_config("[[handler]]\nname = \"\"\ntype = \"echo\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
