// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vitrin_app::AdminView;

pub const APP_NAME: &str = "vitrin";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_INGREDIENT: &str = "kofe";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            catalog: Catalog::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub image_origin: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            image_origin: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub start_view: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub default_ingredients: Option<Vec<String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            default_ingredients: Some(vec![DEFAULT_INGREDIENT.to_owned()]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("VITRIN_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set VITRIN_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [api], [ui], [catalog] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            vitrin_api::url_origin(base_url).with_context(|| {
                format!("api.base_url in {} must be an http(s) URL", path.display())
            })?;
        }

        if let Some(origin) = &self.api.image_origin
            && origin.trim().is_empty()
        {
            bail!(
                "api.image_origin in {} is empty; remove it to derive the origin from api.base_url",
                path.display()
            );
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(view) = &self.ui.start_view
            && AdminView::parse(view).is_none()
        {
            bail!(
                "ui.start_view in {} must be one of products, categories, subcategories; got {view:?}",
                path.display()
            );
        }

        Ok(())
    }

    /// The catalog API root; `VITRIN_API_URL` wins over the file.
    pub fn base_url(&self) -> String {
        if let Ok(url) = env::var("VITRIN_API_URL")
            && !url.trim().is_empty()
        {
            return url.trim().trim_end_matches('/').to_owned();
        }
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_owned()
    }

    pub fn image_origin(&self) -> Result<String> {
        match &self.api.image_origin {
            Some(origin) => Ok(origin.trim().trim_end_matches('/').to_owned()),
            None => vitrin_api::url_origin(&self.base_url()),
        }
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn start_view(&self) -> AdminView {
        self.ui
            .start_view
            .as_deref()
            .and_then(AdminView::parse)
            .unwrap_or(AdminView::Products)
    }

    pub fn default_ingredients(&self) -> Vec<String> {
        self.catalog
            .default_ingredients
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_INGREDIENT.to_owned()])
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(file) => Ok(PathBuf::from(file)),
            None => {
                let data_root = dirs::data_dir().ok_or_else(|| {
                    anyhow!("cannot resolve data directory; set [log].file in the config")
                })?;
                Ok(data_root.join(APP_NAME).join("vitrin.log"))
            }
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# vitrin config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\n# Optional. Defaults to the origin of base_url.\n# image_origin = \"https://cdn.example.com\"\ntimeout = \"{}\"\n\n[ui]\nstart_view = \"products\"\n\n[catalog]\ndefault_ingredients = [\"{}\"]\n\n[log]\nlevel = \"{}\"\n# Optional. Default is platform data dir (for example ~/.local/share/vitrin/vitrin.log)\n# file = \"/absolute/path/to/vitrin.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_INGREDIENT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

/// Parses `<N>ms`, `<N>s` or `<N>m`.
fn parse_duration(raw: &str) -> Result<Duration> {
    let trimmed = raw.trim();
    let split = trimmed
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let amount: u64 = digits
        .parse()
        .with_context(|| format!("invalid timeout duration {raw:?}"))?;
    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount.saturating_mul(60))),
        _ => bail!(
            "invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)"
        ),
    }
}
