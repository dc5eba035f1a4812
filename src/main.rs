use std::{path::Path, process};

use hydrator::{
    application::{
        error::AppError,
        guide::authoring_guide,
        loader::{FragmentLoader, LoaderStatus},
        ports::ContentSource,
        render::{MarkdownRenderService, RenderService},
    },
    config::{self, Command, GuideArgs, RenderArgs, Settings, SourceSettings},
    infra::{
        content::{FsContentSource, HttpContentSource, decode_body},
        error::InfraError,
        page::PageDocument,
        telemetry,
    },
};
use tokio::{io::AsyncWriteExt, signal};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(Command::Hydrate(Box::default()));

    telemetry::init(&settings.logging)?;

    match command {
        Command::Hydrate(_) => run_hydrate(settings).await,
        Command::Render(args) => run_render(args).await,
        Command::Guide(args) => run_guide(args),
        Command::Targets => run_targets(&settings),
    }
}

async fn run_hydrate(settings: Settings) -> Result<(), AppError> {
    let input = settings.page.input.clone().ok_or_else(|| {
        AppError::unexpected("no page to hydrate: set page.input or pass --page")
    })?;
    let page = PageDocument::load(&input).await?;

    info!(
        target: "hydrator::loader",
        page = %input.display(),
        fragments = settings.catalog.len(),
        poll_interval_ms = settings.loader.poll_interval.as_millis() as u64,
        "starting hydration"
    );

    match &settings.source {
        SourceSettings::Fs { directory } => {
            hydrate(FsContentSource::new(directory.clone()), page, &settings).await
        }
        SourceSettings::Http { base_url } => {
            let source = HttpContentSource::new(base_url.as_str())?;
            hydrate(source, page, &settings).await
        }
    }
}

async fn hydrate<S>(source: S, page: PageDocument, settings: &Settings) -> Result<(), AppError>
where
    S: ContentSource,
{
    let mut loader = FragmentLoader::new(settings.catalog.clone(), source, page)
        .with_poll_interval(settings.loader.poll_interval);

    let interrupted = tokio::select! {
        _ = loader.run() => false,
        _ = signal::ctrl_c() => true,
    };

    let status = loader.status();
    if interrupted {
        warn!(
            target: "hydrator::loader",
            loaded = status.loaded.len(),
            total = status.total,
            "interrupted before every fragment was loaded"
        );
    }

    let page = loader.into_binder();
    match settings.page.output.as_deref() {
        Some(path) => write_page(&page, path).await?,
        None => write_stdout(page.html()).await?,
    }

    report_status(&status);
    Ok(())
}

async fn write_page(page: &PageDocument, path: &Path) -> Result<(), AppError> {
    page.write_to(path).await?;
    info!(target: "hydrator::page", output = %path.display(), "hydrated page written");
    Ok(())
}

async fn write_stdout(contents: &str) -> Result<(), AppError> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(contents.as_bytes())
        .await
        .map_err(InfraError::from)?;
    stdout.flush().await.map_err(InfraError::from)?;
    Ok(())
}

fn report_status(status: &LoaderStatus) {
    eprintln!("{status}");
}

async fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .map_err(InfraError::from)?;
    let html = MarkdownRenderService::new().render(&decode_body(&bytes));
    println!("{html}");
    Ok(())
}

fn run_guide(args: GuideArgs) -> Result<(), AppError> {
    println!("{}", authoring_guide(args.fragment.as_deref()));
    Ok(())
}

fn run_targets(settings: &Settings) -> Result<(), AppError> {
    let catalog = &settings.catalog;
    for fragment in catalog.fragments() {
        match catalog.target(fragment) {
            Some(target) => println!("{fragment} -> #{target}"),
            None => println!("{fragment} -> (unmapped)"),
        }
    }
    Ok(())
}
