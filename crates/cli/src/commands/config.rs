use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use stackwise_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILE};
use toml::Value;

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key_path: "database.url",
            env_keys: &["STACKWISE_DATABASE_URL"],
            value: config.database.url.clone(),
        },
        Field {
            key_path: "database.max_connections",
            env_keys: &["STACKWISE_DATABASE_MAX_CONNECTIONS"],
            value: config.database.max_connections.to_string(),
        },
        Field {
            key_path: "database.timeout_secs",
            env_keys: &["STACKWISE_DATABASE_TIMEOUT_SECS"],
            value: config.database.timeout_secs.to_string(),
        },
        Field {
            key_path: "estimation.catalog_path",
            env_keys: &["STACKWISE_ESTIMATION_CATALOG_PATH"],
            value: config
                .estimation
                .catalog_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<built-in>".to_string()),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["STACKWISE_LOGGING_LEVEL", "STACKWISE_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["STACKWISE_LOGGING_FORMAT", "STACKWISE_LOG_FORMAT"],
            value: config.logging.format.as_str().to_string(),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from(DEFAULT_CONFIG_FILE), Path::new("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
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

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use stackwise_core::config::AppConfig;

    use super::{contains_path, field_source, fields};

    #[test]
    fn nested_keys_resolve_against_the_file() {
        let doc: Value = "[database]\nurl = \"sqlite://x.db\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "database.url"));
        assert!(!contains_path(&doc, "database.timeout_secs"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn file_source_names_the_file() {
        let doc: Value = "[logging]\nlevel = \"debug\"\n".parse().expect("toml");

        let source = field_source(
            "logging.level",
            &["STACKWISE_TEST_UNSET_LEVEL"],
            Some(&doc),
            Some(Path::new("stackwise.toml")),
        );
        assert_eq!(source, "file (stackwise.toml)");
        assert_eq!(field_source("logging.format", &[], Some(&doc), None), "default");
    }

    #[test]
    fn listed_fields_are_the_settings_commands_read() {
        let keys: Vec<&str> = fields(&AppConfig::default()).iter().map(|field| field.key_path).collect();

        assert_eq!(
            keys,
            vec![
                "database.url",
                "database.max_connections",
                "database.timeout_secs",
                "estimation.catalog_path",
                "logging.level",
                "logging.format",
            ]
        );
    }
}
