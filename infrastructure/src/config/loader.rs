//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["warden.toml", ".warden.toml"];
const ENV_PREFIX: &str = "WARDEN_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./warden.toml` or `./.warden.toml`
    /// 3. Global: `$XDG_CONFIG_HOME/agent-warden/config.toml`
    /// 4. `WARDEN_*` environment variables (`WARDEN_AGENT__MAX_STEPS=5`)
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        let figment = Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        );
        figment.extract().map_err(Box::new)
    }

    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(path) = global
            && path.exists()
        {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/agent-warden/config.toml`, or the platform equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("agent-warden").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations, highest priority first
    pub fn config_sources() -> Vec<String> {
        let mut sources = Vec::new();

        match Self::project_config_path() {
            Some(path) => sources.push(format!("[FOUND] Project: {}", path.display())),
            None => {
                sources.push("[     ] Project: ./warden.toml or ./.warden.toml".to_string())
            }
        }
        if let Some(path) = Self::global_config_path() {
            let marker = if path.exists() { "FOUND" } else { "     " };
            sources.push(format!("[{}] Global:  {}", marker, path.display()));
        }
        sources.push(format!("[     ] Env:     {}*", ENV_PREFIX));
        sources.push("[     ] Default: built-in defaults".to_string());

        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.agent.max_steps, 10);
        assert_eq!(config.transport.max_retries, 3);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("agent-warden"));
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("warden.toml");
        let explicit = dir.path().join("explicit.toml");
        fs::write(
            &global,
            "[agent]\nmodel = \"global-model\"\nmax_steps = 4\n",
        )
        .unwrap();
        fs::write(&project, "[agent]\nmax_steps = 7\n").unwrap();
        fs::write(&explicit, "[tools]\ndefault_rate_limit = 5\n").unwrap();

        let config: FileConfig =
            ConfigLoader::figment(Some(&global), Some(&project), Some(&explicit))
                .extract()
                .unwrap();

        assert_eq!(config.agent.model, "global-model");
        assert_eq!(config.agent.max_steps, 7);
        assert_eq!(config.tools.default_rate_limit, 5);
        assert_eq!(config.agent.max_tokens, 500);
    }

    #[test]
    fn test_missing_global_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let config: FileConfig = ConfigLoader::figment(Some(&missing), None, None)
            .extract()
            .unwrap();
        assert_eq!(config, FileConfig::default());
    }
}
