//! Config command implementation.
//!
//! View and initialize configuration settings.
//! Config file is located at ~/.config/hfilter/config.toml.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use haystack_model_rs::{DefNamespace, Dict, Symbol, Value};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{heading, CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HFILTER_CONFIG";

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# hfilter - Haystack filter tool configuration

# Config schema version (do not modify)
version = 1

# Output preferences
[output]
# color = true   # Enable colors (respects NO_COLOR env)
# json = false   # Always print JSON

# Defs used by `hfilter v3` and `hfilter implied`.
#
# is            - supertypes
# implied_by    - tags that stand in for this def when it is absent
# transitive    - relationship that chains through refs
# relationships - on ref tags, the relationships they implement

[defs.equip]

[defs.ahu]
is = ["equip"]

[defs.rtu]
is = ["ahu"]

[defs.inputs]
transitive = true

[defs.elec]

[defs.elecRef]
relationships = { inputs = "elec" }
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Def table keyed by def name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defs: BTreeMap<String, DefConfig>,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            output: OutputConfig::default(),
            defs: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Builds a namespace from the `[defs]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Config`] if a def or symbol name is not a
    /// valid Haystack name.
    pub fn namespace(&self) -> Result<DefNamespace> {
        let mut namespace = DefNamespace::new();
        for (name, def) in &self.defs {
            namespace
                .insert(def.to_dict(name)?)
                .map_err(|e| CommandError::Config(format!("Invalid def '{}': {}", name, e)))?;
        }
        debug!("loaded {} def(s) from config", namespace.len());
        Ok(namespace)
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// Always print JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

/// One `[defs.<name>]` table.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefConfig {
    /// Supertype names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub is: Vec<String>,

    /// Names that imply this def.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implied_by: Vec<String>,

    /// Marks a relationship def as transitive.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub transitive: bool,

    /// Relationship name to target term, for ref tag defs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, String>,
}

impl DefConfig {
    /// Converts the table into a def record named `name`.
    fn to_dict(&self, name: &str) -> Result<Dict> {
        let mut def = Dict::new().with("def", symbol(name)?);
        if !self.is.is_empty() {
            def.insert("is", symbols(&self.is)?);
        }
        if !self.implied_by.is_empty() {
            def.insert("impliedBy", symbols(&self.implied_by)?);
        }
        if self.transitive {
            def.insert("transitive", Value::Marker);
        }
        for (relationship, term) in &self.relationships {
            def.insert(relationship.as_str(), symbol(term)?);
        }
        Ok(def)
    }
}

fn symbol(name: &str) -> Result<Symbol> {
    Symbol::parse(name)
        .map_err(|e| CommandError::Config(format!("Invalid symbol '{}': {}", name, e)))
}

fn symbols(names: &[String]) -> Result<Vec<Symbol>> {
    names.iter().map(|name| symbol(name)).collect()
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/hfilter/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    // Use XDG_CONFIG_HOME if set, otherwise ~/.config/hfilter
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("hfilter"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("hfilter"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
///
/// An explicit path (from `--config`) wins over `HFILTER_CONFIG`, which wins
/// over the XDG location.
pub fn get_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
///
/// A missing file yields the default configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = get_config_path(explicit)?;

    if !path.exists() {
        debug!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Config version {} is newer than supported version {}",
            config.version, CONFIG_VERSION
        )));
    }

    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path(ctx.config_path.as_deref())?;
    let config = load_config(Some(&path))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("{}\n", heading(ctx, "Configuration"));

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }
            if let Some(json) = config.output.json {
                println!("  json: {}", json);
            }

            println!("\n[defs]");
            for (name, def) in &config.defs {
                println!("  {}{}", name, describe_def(def));
            }
        } else {
            println!("(No config file exists. Run 'hfilter config init' to create one.)");
        }
    }

    Ok(())
}

/// Formats the non-empty parts of a def for `config show`.
fn describe_def(def: &DefConfig) -> String {
    let mut parts = Vec::new();
    if !def.is.is_empty() {
        parts.push(format!("is {}", def.is.join(", ")));
    }
    if !def.implied_by.is_empty() {
        parts.push(format!("implied by {}", def.implied_by.join(", ")));
    }
    if def.transitive {
        parts.push("transitive".to_string());
    }
    for (relationship, term) in &def.relationships {
        parts.push(format!("{}? ^{}", relationship, term));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(": {}", parts.join("; "))
    }
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path(ctx.config_path.as_deref())?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path(ctx.config_path.as_deref())?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }

    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Created config at: {}", path.display());
    }

    Ok(())
}
