mod browse;
mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dash_core::generator::clamp_count;
use dash_core::{
    generate_with_progress, CancelFlag, DashConfig, Dashboard, ResourceClient, ResourceSource,
    ResourceStats, SourceKind,
};
use ehr_resource::{Resources, ResourceWrapper};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ehr-dash")]
#[command(about = "EHR resource dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic resource records as JSON
    Generate {
        /// Number of records (at most 1,000,000)
        #[arg(long)]
        count: Option<usize>,
        /// Output file (defaults to stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print summary figures for a record set
    Stats {
        /// Record source: local, remote, placeholder or sample
        #[arg(long, default_value = "local")]
        source: SourceKind,
        /// Number of records to load
        #[arg(long)]
        count: Option<usize>,
    },
    /// Browse records in an interactive table
    Browse {
        /// Record source: local, remote, placeholder or sample
        #[arg(long, default_value = "local")]
        source: SourceKind,
        /// Number of records to load
        #[arg(long)]
        count: Option<usize>,
        /// Initial search text
        #[arg(long)]
        query: Option<String>,
        /// Rows per page
        #[arg(long)]
        page_size: Option<usize>,
        /// Table rows visible at once
        #[arg(long, default_value_t = 20)]
        rows: u32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dash_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = DashConfig::from_env()?;

    match cli.command {
        Some(Commands::Generate { count, out }) => {
            let count = count.unwrap_or(cfg.default_count());
            generate(count, out.as_deref()).await?;
        }
        Some(Commands::Stats { source, count }) => {
            let client = ResourceClient::new(source, &cfg)?;
            let count = count.unwrap_or(cfg.default_count());
            let records = fetch_all(&client, count).await?;
            println!("{}", render::render_stats(&ResourceStats::from_records(&records)));
        }
        Some(Commands::Browse {
            source,
            count,
            query,
            page_size,
            rows,
        }) => {
            let client = ResourceClient::new(source, &cfg)?;
            let mut dash = Dashboard::new(&cfg.clone().with_geometry(1, rows))?;
            if let Some(page_size) = page_size {
                dash.set_page_size(page_size)?;
            }
            if let Some(query) = query {
                dash.set_query(query);
            }
            let count = count.unwrap_or(cfg.default_count());
            browse::run(&client, &mut dash, count).await?;
        }
        None => {
            println!("Use 'ehr-dash --help' for commands");
        }
    }

    Ok(())
}

/// Generate `count` records with a progress bar; Ctrl-C cancels.
async fn generate(count: usize, out: Option<&Path>) -> anyhow::Result<()> {
    let count = clamp_count(count);
    let cancel = CancelFlag::new();
    let bar = render::progress_bar("Generating resources");

    let generation =
        generate_with_progress(count, |percent| bar.set_position(u64::from(percent)), &cancel);
    tokio::pin!(generation);
    let result = tokio::select! {
        result = &mut generation => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            cancel.cancel();
            generation.await
        }
    };
    bar.finish_and_clear();

    let records = result.context("record generation failed")?;
    write_records(&records, out)?;
    tracing::info!("Generated {} resource records", records.len());
    Ok(())
}

async fn fetch_all(client: &ResourceClient, count: usize) -> anyhow::Result<Vec<ResourceWrapper>> {
    let bar = render::progress_bar("Loading resource data");
    let records = client
        .fetch(count, &mut |percent| bar.set_position(u64::from(percent)))
        .await;
    bar.finish_and_clear();
    records.with_context(|| format!("failed to load resources from {} source", client.kind()))
}

fn write_records(records: &[ResourceWrapper], out: Option<&Path>) -> anyhow::Result<()> {
    let json = Resources::render(records)?;
    match out {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
