use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::ai_provider::AIError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub defaults: DefaultConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub gemini: Option<ProviderSettings>,
    pub claude: Option<ProviderSettings>,
    pub openai: Option<ProviderSettings>,
    pub openrouter: Option<ProviderSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub api_key: Option<String>,
    /// Only used by OpenAI-compatible providers
    pub base_url: Option<String>,
}

impl ProviderSettings {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn timeout(&self) -> Duration {
        self.timeout
            .map(Duration::from_secs)
            .unwrap_or(Self::DEFAULT_TIMEOUT)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultConfig {
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Incident store file; see `data_path::memory_path`
    pub path: Option<PathBuf>,
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,
}

fn default_memory_enabled() -> bool {
    true
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            enabled: default_memory_enabled(),
        }
    }
}

impl Config {
    pub const DEFAULT_PROVIDER: &'static str = "gemini";

    /// Load `.logpilot.toml` from the working directory, else
    /// `~/.config/logpilot/config.toml`, else defaults.
    ///
    /// A config file that does not parse is ignored with a warning.
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            return Ok(Self::load_from_path(&config_path));
        }
        debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    pub fn load_from_path(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read config {}: {}", path.display(), e);
                return Config::default();
            }
        };
        match Self::from_toml_str(&content) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring unparseable config {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Environment variables consulted for a provider's key, in order.
    pub fn api_key_env_vars(provider: &str) -> Vec<String> {
        let provider = provider.to_lowercase();
        let mut vars = vec![format!("{}_API_KEY", provider.to_uppercase())];
        match provider.as_str() {
            "gemini" => vars.push("GOOGLE_API_KEY".to_string()),
            "claude" => vars.push("ANTHROPIC_API_KEY".to_string()),
            "anthropic" => vars.push("CLAUDE_API_KEY".to_string()),
            _ => {}
        }
        vars
    }

    /// Priority: environment variable > config file > None
    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        for var in Self::api_key_env_vars(provider) {
            if let Ok(key) = env::var(&var) {
                if !key.trim().is_empty() {
                    return Some(key);
                }
            }
        }
        self.get_provider_settings(provider)
            .and_then(|p| p.api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }

    /// Resolve a key or fail with the configuration error callers surface verbatim.
    pub fn require_api_key(&self, provider: &str) -> Result<String, AIError> {
        self.get_api_key(provider).ok_or_else(|| AIError::MissingApiKey {
            provider: provider.to_lowercase(),
            env_var: Self::api_key_env_vars(provider).join(" or "),
        })
    }

    pub fn get_provider_settings(&self, provider: &str) -> Option<&ProviderSettings> {
        match provider.to_lowercase().as_str() {
            "gemini" => self.providers.gemini.as_ref(),
            "claude" | "anthropic" => self.providers.claude.as_ref(),
            "openai" => self.providers.openai.as_ref(),
            "openrouter" => self.providers.openrouter.as_ref(),
            _ => None,
        }
    }

    pub fn get_default_provider(&self) -> String {
        self.defaults
            .provider
            .as_deref()
            .unwrap_or(Self::DEFAULT_PROVIDER)
            .to_string()
    }

    fn get_config_path() -> Option<PathBuf> {
        // Check for project-level config first
        if let Ok(current_dir) = env::current_dir() {
            let project_config = current_dir.join(".logpilot.toml");
            if project_config.exists() {
                return Some(project_config);
            }
        }

        // Check for user-level config
        if let Some(home_dir) = dirs::home_dir() {
            let user_config = home_dir.join(".config").join("logpilot").join("config.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.get_default_provider(), "gemini");
        assert!(config.get_provider_settings("gemini").is_none());
        assert!(config.memory.path.is_none());
        assert!(config.memory.enabled);
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
[providers.gemini]
model = "gemini-1.5-pro"
timeout = 30
api_key = "from-file"

[providers.openrouter]
base_url = "http://localhost:9000/v1"

[defaults]
provider = "openrouter"

[memory]
path = "/tmp/incidents.json"
"#;
        let config = Config::from_toml_str(toml_str).unwrap();
        let gemini = config.get_provider_settings("GEMINI").unwrap();
        assert_eq!(gemini.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(gemini.timeout(), Duration::from_secs(30));
        assert_eq!(config.get_default_provider(), "openrouter");
        assert_eq!(config.memory.path, Some(PathBuf::from("/tmp/incidents.json")));
        assert!(config.memory.enabled);
        assert_eq!(
            config.get_provider_settings("openrouter").unwrap().base_url.as_deref(),
            Some("http://localhost:9000/v1")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml_str("[defaults]\n").unwrap();
        assert_eq!(config.get_default_provider(), "gemini");
        assert_eq!(ProviderSettings::default().timeout(), ProviderSettings::DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_api_key_from_config_file() {
        let mut config = Config::default();
        config.providers.openrouter = Some(ProviderSettings {
            api_key: Some("file-key".to_string()),
            ..ProviderSettings::default()
        });
        // Assumes OPENROUTER_API_KEY is not exported in the test environment
        if env::var("OPENROUTER_API_KEY").is_err() {
            assert_eq!(config.get_api_key("openrouter"), Some("file-key".to_string()));
        }
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = Config::default();
        let err = config.require_api_key("no-such-provider").unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("NO-SUCH-PROVIDER_API_KEY"));
    }

    #[test]
    fn test_gemini_key_env_vars() {
        assert_eq!(
            Config::api_key_env_vars("gemini"),
            vec!["GEMINI_API_KEY".to_string(), "GOOGLE_API_KEY".to_string()]
        );
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.defaults.provider = Some("claude".to_string());
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path);
        assert_eq!(loaded.get_default_provider(), "claude");
    }

    #[test]
    fn test_unparseable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(Config::load_from_path(&path).get_default_provider(), "gemini");
    }
}
