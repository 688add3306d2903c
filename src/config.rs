use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Optional artifact; absence only downgrades the health report
    #[serde(default = "default_model_path")]
    pub path: String,
}

fn default_model_path() -> String {
    "theft_model.pkl".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_path")]
    pub path: String,
}

fn default_dashboard_path() -> String {
    "templates/dashboard.html".into()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            path: default_dashboard_path(),
        }
    }
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    /// Afterwards `SERVER_PORT` and `MODEL_PATH` override whatever the file had.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let expanded = expand_env_placeholders(&raw)?;
        // An empty document parses to unit, not to a mapping
        let mut cfg: Self = if expanded.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&expanded)?
        };

        if let Ok(port) = std::env::var("SERVER_PORT") {
            cfg.server.port = port
                .parse()
                .map_err(|_| AppError::Config(format!("invalid SERVER_PORT: {}", port)))?;
        }

        if let Ok(model_path) = std::env::var("MODEL_PATH") {
            cfg.model.path = model_path;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(AppError::Config("server host cannot be empty".to_string()));
        }

        if self.dashboard.path.is_empty() {
            return Err(AppError::Config(
                "dashboard path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Expand $(VAR) and ${VAR} placeholders using environment variables.
/// "$$" becomes a literal "$".
fn expand_env_placeholders(input: &str) -> anyhow::Result<String> {
    use anyhow::Context;

    let mut out = String::with_capacity(input.len());
    let mut it = input.chars().peekable();

    while let Some(c) = it.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let close = match it.peek().copied() {
            Some('$') => {
                it.next();
                out.push('$');
                continue;
            }
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                continue;
            }
        };

        it.next();
        let var = read_until(&mut it, close)
            .with_context(|| format!("unterminated env placeholder: missing '{}'", close))?;
        let val = std::env::var(&var)
            .with_context(|| format!("missing environment variable: {}", var))?;
        out.push_str(&val);
    }

    Ok(out)
}

/// Read characters until we hit `end`, returning the collected string.
fn read_until<I>(it: &mut std::iter::Peekable<I>, end: char) -> Option<String>
where
    I: Iterator<Item = char>,
{
    let mut buf = String::new();
    for ch in it.by_ref() {
        if ch == end {
            return Some(buf);
        }
        buf.push(ch);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path =
            std::env::temp_dir().join(format!("{}-{}.yaml", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_match_original_bind() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 5001);
        assert_eq!(cfg.model.path, "theft_model.pkl");
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5001");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let path = write_temp(
            "theft-config-partial",
            r#"
server:
  port: 8080
"#,
        );

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.dashboard.path, "templates/dashboard.html");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_document_is_default() {
        let path = write_temp("theft-config-empty", "");
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5001");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/theft-detection/config.yaml");
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_expand_placeholders() {
        std::env::set_var("THEFT_TEST_MODEL_DIR", "/srv/models");
        let out =
            expand_env_placeholders("a: $(THEFT_TEST_MODEL_DIR)/m.pkl\nb: ${THEFT_TEST_MODEL_DIR}")
                .unwrap();
        assert_eq!(out, "a: /srv/models/m.pkl\nb: /srv/models");
        std::env::remove_var("THEFT_TEST_MODEL_DIR");
    }

    #[test]
    fn test_expand_escape_and_plain_dollar() {
        let out = expand_env_placeholders("cost: $$5 and $x").unwrap();
        assert_eq!(out, "cost: $5 and $x");
    }

    #[test]
    fn test_expand_unterminated_placeholder() {
        assert!(expand_env_placeholders("x: ${NEVER_CLOSED").is_err());
    }

    #[test]
    fn test_expand_missing_variable() {
        assert!(expand_env_placeholders("x: $(THEFT_TEST_SURELY_UNSET_VAR)").is_err());
    }

    #[test]
    fn test_empty_host_rejected() {
        let path = write_temp(
            "theft-config-bad-host",
            r#"
server:
  host: ""
"#,
        );

        let result = Config::load(&path);
        assert!(matches!(result, Err(AppError::Config(_))));

        std::fs::remove_file(&path).ok();
    }
}
