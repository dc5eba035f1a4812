use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the hydrator binary.
#[derive(Debug, Parser)]
#[command(
    name = "hydrator",
    version,
    about = "Fill page placeholders with operator-edited content fragments"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "HYDRATOR_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Poll the content source and hydrate the page until every fragment is loaded.
    Hydrate(Box<HydrateArgs>),
    /// Render one fragment file to HTML and print it.
    Render(RenderArgs),
    /// Print formatting help for fragment authors.
    Guide(GuideArgs),
    /// Print the fragment to page-target table in use.
    Targets,
}

#[derive(Debug, Args, Default, Clone)]
pub struct HydrateArgs {
    #[command(flatten)]
    pub overrides: HydrateOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct HydrateOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the delay between poll passes.
    #[arg(long = "poll-interval-ms", value_name = "MILLIS")]
    pub poll_interval_ms: Option<u64>,

    /// Read fragments from this directory.
    #[arg(
        long = "content-dir",
        value_name = "PATH",
        value_hint = ValueHint::DirPath,
        conflicts_with = "content_url"
    )]
    pub content_dir: Option<PathBuf>,

    /// Fetch fragments over HTTP relative to this base URL.
    #[arg(long = "content-url", value_name = "URL", value_hint = ValueHint::Url)]
    pub content_url: Option<String>,

    /// Page to hydrate.
    #[arg(long = "page", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub page: Option<PathBuf>,

    /// Where to write the hydrated page; stdout when unset.
    #[arg(long = "output", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Fragment file to render.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GuideArgs {
    /// Address the guide to one fragment file.
    #[arg(value_name = "FRAGMENT")]
    pub fragment: Option<String>,
}
