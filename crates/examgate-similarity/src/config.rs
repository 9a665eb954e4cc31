//! Configuration loading and grader factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examgate_core::traits::SimilarityGrader;

use crate::http::{HttpSimilarityGrader, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Settings for the similarity-scoring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderSettings {
    /// Base URL of the grading server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bounded request timeout per similarity call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for GraderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Top-level examgate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamgateConfig {
    #[serde(default)]
    pub grader: GraderSettings,
    /// Max concurrent similarity calls per grading run.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_parallelism() -> usize {
    4
}

impl Default for ExamgateConfig {
    fn default() -> Self {
        Self {
            grader: GraderSettings::default(),
            parallelism: default_parallelism(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examgate.toml` in the current directory
/// 2. `~/.config/examgate/config.toml`
///
/// Environment variable override: `EXAMGATE_GRADER_URL`.
pub fn load_config() -> Result<ExamgateConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamgateConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examgate.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamgateConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamgateConfig::default(),
    };

    if let Ok(url) = std::env::var("EXAMGATE_GRADER_URL") {
        config.grader.base_url = url;
    }
    config.grader.base_url = resolve_env_vars(&config.grader.base_url);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examgate"))
}

/// Create a similarity grader from its configuration.
pub fn create_grader(config: &ExamgateConfig) -> Arc<dyn SimilarityGrader> {
    Arc::new(HttpSimilarityGrader::new(
        config.grader.base_url.clone(),
        Duration::from_secs(config.grader.timeout_secs),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EXAMGATE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_EXAMGATE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_EXAMGATE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_EXAMGATE_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = ExamgateConfig::default();
        assert_eq!(config.grader.base_url, "http://localhost:8000");
        assert_eq!(config.grader.timeout_secs, 20);
        assert_eq!(config.parallelism, 4);
    }

    #[test]
    fn parse_config_file() {
        let toml_str = r#"
parallelism = 8

[grader]
base_url = "http://grading.internal:9000"
timeout_secs = 5
"#;
        let config: ExamgateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.grader.base_url, "http://grading.internal:9000");
        assert_eq!(config.grader.timeout_secs, 5);
        assert_eq!(config.parallelism, 8);
    }

    #[test]
    fn explicit_path_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examgate.toml");
        std::fs::write(&path, "[grader]\nbase_url = \"http://example:1234\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.grader.base_url, "http://example:1234");
        assert_eq!(config.parallelism, 4);

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
