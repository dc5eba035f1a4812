//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::fragments::FragmentCatalog;

pub use cli::{CliArgs, Command, GuideArgs, HydrateArgs, HydrateOverrides, RenderArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "hydrator";
const ENV_PREFIX: &str = "HYDRATOR";
const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
const DEFAULT_CONTENT_DIR: &str = "content";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub loader: LoaderSettings,
    pub source: SourceSettings,
    pub page: PageSettings,
    pub catalog: FragmentCatalog,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub poll_interval: Duration,
}

/// Where fragment bodies come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSettings {
    Fs { directory: PathBuf },
    Http { base_url: Url },
}

#[derive(Debug, Clone, Default)]
pub struct PageSettings {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    if let Some(Command::Hydrate(args)) = cli.command.as_ref() {
        raw.apply_hydrate_overrides(&args.overrides);
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    loader: RawLoaderSettings,
    source: RawSourceSettings,
    page: RawPageSettings,
    fragments: Option<Vec<RawFragment>>,
}

impl RawSettings {
    fn apply_hydrate_overrides(&mut self, overrides: &HydrateOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(interval) = overrides.poll_interval_ms {
            self.loader.poll_interval_ms = Some(interval);
        }
        if let Some(directory) = overrides.content_dir.as_ref() {
            self.source.kind = Some(SourceKind::Fs);
            self.source.directory = Some(directory.clone());
        }
        if let Some(url) = overrides.content_url.as_ref() {
            self.source.kind = Some(SourceKind::Http);
            self.source.base_url = Some(url.clone());
        }
        if let Some(page) = overrides.page.as_ref() {
            self.page.input = Some(page.clone());
        }
        if let Some(output) = overrides.output.as_ref() {
            self.page.output = Some(output.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            loader,
            source,
            page,
            fragments,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let loader = build_loader_settings(loader)?;
        let source = build_source_settings(source)?;
        let page = build_page_settings(page);
        let catalog = build_catalog(fragments)?;

        Ok(Self {
            logging,
            loader,
            source,
            page,
            catalog,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_loader_settings(loader: RawLoaderSettings) -> Result<LoaderSettings, LoadError> {
    let millis = loader.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS);
    if millis == 0 {
        return Err(LoadError::invalid(
            "loader.poll_interval_ms",
            "must be greater than zero",
        ));
    }
    Ok(LoaderSettings {
        poll_interval: Duration::from_millis(millis),
    })
}

fn build_source_settings(source: RawSourceSettings) -> Result<SourceSettings, LoadError> {
    match source.kind.unwrap_or_default() {
        SourceKind::Fs => {
            let directory = source
                .directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));
            if directory.as_os_str().is_empty() {
                return Err(LoadError::invalid(
                    "source.directory",
                    "must not be empty",
                ));
            }
            Ok(SourceSettings::Fs { directory })
        }
        SourceKind::Http => {
            let raw = source
                .base_url
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    LoadError::invalid("source.base_url", "required when source.kind = \"http\"")
                })?;
            let base_url = Url::parse(&raw)
                .map_err(|err| LoadError::invalid("source.base_url", err.to_string()))?;
            if !matches!(base_url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "source.base_url",
                    format!("unsupported scheme `{}`", base_url.scheme()),
                ));
            }
            Ok(SourceSettings::Http { base_url })
        }
    }
}

fn build_page_settings(page: RawPageSettings) -> PageSettings {
    PageSettings {
        input: page.input,
        output: page.output,
    }
}

fn build_catalog(fragments: Option<Vec<RawFragment>>) -> Result<FragmentCatalog, LoadError> {
    let Some(fragments) = fragments else {
        return Ok(FragmentCatalog::standard());
    };

    fragments
        .into_iter()
        .try_fold(FragmentCatalog::empty(), |catalog, fragment| {
            match fragment.target {
                Some(target) => catalog.with_mapped(fragment.id, target),
                None => catalog.with_unmapped(fragment.id),
            }
        })
        .map_err(|err| LoadError::invalid("fragments", err.to_string()))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoaderSettings {
    poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum SourceKind {
    #[default]
    Fs,
    Http,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSourceSettings {
    kind: Option<SourceKind>,
    directory: Option<PathBuf>,
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPageSettings {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawFragment {
    id: String,
    target: Option<String>,
}
