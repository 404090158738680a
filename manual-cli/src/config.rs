use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "./manual.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ManualConfig {
    /// Build and serve settings
    pub build: BuildConfig,
    /// Site, content and markdown settings (from manual-core)
    #[serde(flatten)]
    pub site: manual_core::config::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory for generated site
    pub output: String,
    /// Theme directory
    pub theme: String,
    /// Configuration file path
    pub config: String,
    /// Host for the page server
    pub host: String,
    /// Port for the page server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
    /// Reload browsers when content changes
    pub live_reload: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: "./out".to_string(),
            theme: "./theme".to_string(),
            config: DEFAULT_CONFIG_FILE.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
            live_reload: true,
        }
    }
}

impl ManualConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (MANUAL_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = string_arg(args, "config").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::from(Path::new(&config_file)));
        }

        // 3. Add environment variables with MANUAL_ prefix
        builder = builder.add_source(
            Environment::with_prefix("MANUAL")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority)
        let mut cli_overrides = HashMap::new();

        // Only override with CLI args that are actually defined for this command
        for (arg, key) in [
            ("source", "content.root"),
            ("output", "build.output"),
            ("theme", "build.theme"),
            ("config", "build.config"),
            ("host", "build.host"),
            ("highlight", "markdown.highlight_theme"),
        ] {
            if let Some(value) = string_arg(args, arg) {
                cli_overrides.insert(key.to_string(), value);
            }
        }
        if let Some(port) = string_arg(args, "port") {
            if let Ok(port_num) = port.parse::<u16>() {
                cli_overrides.insert("build.port".to_string(), port_num.to_string());
            }
        }
        if flag_arg(args, "open") {
            cli_overrides.insert("build.open".to_string(), "true".to_string());
        }
        if flag_arg(args, "no-live-reload") {
            cli_overrides.insert("build.live_reload".to_string(), "false".to_string());
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(config::Config::try_from(&cli_overrides)?);
        }

        // Build and deserialize
        let config = builder.build()?;
        let manual_config: ManualConfig = config.try_deserialize()?;

        Ok(manual_config)
    }
}

fn string_arg(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).ok().flatten().cloned()
}

fn flag_arg(args: &ArgMatches, id: &str) -> bool {
    matches!(args.try_get_one::<bool>(id), Ok(Some(&true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};
    use std::path::PathBuf;

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new("source").long("source").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("config").long("config").value_name("FILE"))
            .arg(Arg::new("open").long("open").action(ArgAction::SetTrue))
    }

    #[test]
    fn test_default_config() {
        let config = ManualConfig::default();
        assert_eq!(config.site.content.root, PathBuf::from("./content"));
        assert_eq!(config.build.output, "./out");
        assert_eq!(config.build.theme, "./theme");
        assert_eq!(config.build.port, 3000);
        assert!(config.build.live_reload);
    }

    #[test]
    fn test_cli_args_override() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("manual.toml");
        let matches = command()
            .try_get_matches_from(vec![
                "test",
                "--source",
                "/custom/content",
                "--output",
                "/custom/output",
                "--config",
                missing.to_str().unwrap(),
                "--open",
            ])
            .unwrap();

        let config = ManualConfig::load(&matches).unwrap();
        assert_eq!(config.site.content.root, PathBuf::from("/custom/content"));
        assert_eq!(config.build.output, "/custom/output");
        assert!(config.build.open);
        // Should still have defaults for non-overridden values
        assert_eq!(config.build.theme, "./theme");
    }

    #[test]
    fn test_config_file_below_cli() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("manual.toml");
        std::fs::write(
            &file,
            "[site]\ntitle = \"Handbook\"\n\n[content]\nroot = \"/from/file\"\n\n[build]\nport = 4000\n",
        )
        .unwrap();

        let matches = command()
            .try_get_matches_from(vec![
                "test",
                "--config",
                file.to_str().unwrap(),
                "--output",
                "/cli/out",
            ])
            .unwrap();

        let config = ManualConfig::load(&matches).unwrap();
        assert_eq!(config.site.site.title, "Handbook");
        assert_eq!(config.site.content.root, PathBuf::from("/from/file"));
        assert_eq!(config.build.port, 4000);
        assert_eq!(config.build.output, "/cli/out");
    }
}
