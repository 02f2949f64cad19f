//! Folio - content ingestion for Markdown blogs.

use anyhow::Result;
use clap::Parser;
use folio::{
    cli::{Cli, Commands},
    config::SiteConfig,
    export, log, logger, pipeline,
    post::Post,
};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logger::set_quiet(cli.quiet);
    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build => build(&config),
        Commands::Check => check(&config),
        Commands::List { tag, drafts } => list(&config, tag.as_deref(), *drafts),
    }
}

/// Ingest everything and write the JSON output.
///
/// Segment failures are logged but do not fail the build.
fn build(config: &SiteConfig) -> Result<ExitCode> {
    let (registry, report) = pipeline::run(config)?;
    let written = export::write_to_disk(&registry, &config.build.output)?;

    log!(
        "build";
        "{} posts from {} segments in {} sources, {} failed",
        report.ingested,
        report.segments,
        report.sources,
        report.failures.len()
    );
    for path in written {
        log!("build"; "wrote {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// Ingest only; non-zero exit when any segment failed.
fn check(config: &SiteConfig) -> Result<ExitCode> {
    let (_, report) = pipeline::run(config)?;

    for failure in &report.failures {
        println!("{failure}");
    }

    if report.is_clean() {
        log!("check"; "{} segments ok", report.segments);
        Ok(ExitCode::SUCCESS)
    } else {
        log!(
            "error";
            "{} of {} segments failed",
            report.failures.len(),
            report.segments
        );
        Ok(ExitCode::FAILURE)
    }
}

fn list(config: &SiteConfig, tag: Option<&str>, drafts: bool) -> Result<ExitCode> {
    let (registry, _) = pipeline::run(config)?;

    let posts = match tag {
        Some(tag) => registry.by_tag(tag),
        None => registry.all(),
    };
    for post in posts.into_iter().filter(|post| drafts || !post.is_draft()) {
        println!("{}", format_row(post));
    }
    Ok(ExitCode::SUCCESS)
}

fn format_row(post: &Post) -> String {
    let date = post
        .date()
        .map_or_else(|| "-".repeat(10), |date| date.format("%Y-%m-%d").to_string());
    let draft = if post.is_draft() { " [draft]" } else { "" };
    format!(
        "{date}  {}  {}{draft}",
        post.slug(),
        post.title().unwrap_or_default()
    )
}
