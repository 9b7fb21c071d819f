use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use tally_enrich::EnrichmentConfig;

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub classifier: ClassifierSection,
    #[serde(default)]
    pub enrichment: EnrichmentSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierSection {
    /// "openai" or "anthropic"
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentSection {
    /// TOML file replacing the compiled-in synonym/keyword tables
    pub tables: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierSection {
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                base_url: "https://api.openai.com".to_string(),
                temperature: 0.0,
                max_tokens: 120,
            },
            enrichment: EnrichmentSection::default(),
        }
    }
}

impl Config {
    /// Enrichment tables: the configured override file, else the defaults
    pub fn enrichment_tables(&self) -> Result<EnrichmentConfig> {
        match &self.enrichment.tables {
            Some(path) => {
                debug!(path = %path.display(), "loading enrichment tables");
                EnrichmentConfig::load(path)
            }
            None => Ok(EnrichmentConfig::default()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    save_config_to(cfg, &config_path()?)
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
