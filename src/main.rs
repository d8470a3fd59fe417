// kodegen-linkrot: find dead external links in a source tree and repair them
// with live variants or web archive snapshots.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kodegen_tools_linkrot::{LinkCheckConfig, LinkCheckConfigBuilder, LinkPipeline};
use kodegen_tools_linkrot::config::WithRootDir;

#[derive(Parser, Debug)]
#[command(name = "kodegen-linkrot", version, about = "Link liveness checking and archival repair")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source tree to scan (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Where reports and the progress checkpoint are written
    #[arg(long, global = true)]
    report_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract and probe every URL
    Check(RunArgs),
    /// Check, then find replacements without touching files
    Resolve(RunArgs),
    /// Check, resolve, rewrite the tree and revalidate
    Fix(RunArgs),
    /// Repair nested snapshots and roll back archive URLs that died
    Revalidate(RunArgs),
    /// Print the last probing checkpoint
    Progress,
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// Concurrent probe workers
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-attempt probe timeout
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Redirect budget per request
    #[arg(long)]
    max_redirects: Option<u8>,

    /// Skip the www/host-rule variants and go straight to the archive
    #[arg(long)]
    no_heuristics: bool,

    /// Also resolve dead URLs whose failure may be transient (401/403/429/5xx/timeouts)
    #[arg(long)]
    resolve_all_dead: bool,

    /// Ask the archive for the capture closest to this timestamp (YYYYMMDDhhmmss prefix)
    #[arg(long)]
    archive_timestamp: Option<String>,

    /// Mark lines of dead URLs left without a replacement with a comment
    #[arg(long)]
    annotate_unresolved: bool,

    /// Compute rewrites without writing files
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn base_builder(&self) -> Result<LinkCheckConfigBuilder<WithRootDir>> {
        let builder = match &self.config {
            Some(path) => LinkCheckConfig::from_json_file(path)?.into_builder(),
            None => LinkCheckConfig::builder().root_dir(PathBuf::from(".")),
        };
        let builder = match &self.root {
            Some(root) => builder.root_dir(root.clone()),
            None => builder,
        };
        Ok(match &self.report_dir {
            Some(dir) => builder.report_dir(dir.clone()),
            None => builder,
        })
    }

    fn config(&self, args: &RunArgs) -> Result<LinkCheckConfig> {
        let mut builder = self.base_builder()?;
        if let Some(concurrency) = args.concurrency {
            builder = builder.concurrency(concurrency);
        }
        if let Some(ms) = args.timeout_ms {
            builder = builder.probe_timeout_ms(ms);
        }
        if let Some(redirects) = args.max_redirects {
            builder = builder.max_redirects(redirects);
        }
        if args.no_heuristics {
            builder = builder.enable_heuristics(false);
        }
        if args.resolve_all_dead {
            builder = builder.resolve_all_dead(true);
        }
        if args.archive_timestamp.is_some() {
            builder = builder.archive_timestamp(args.archive_timestamp.clone());
        }
        if args.annotate_unresolved {
            builder = builder.annotate_unresolved(true);
        }
        if args.dry_run {
            builder = builder.dry_run(true);
        }
        builder.build().context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .filter_module("hyper_util", log::LevelFilter::Warn)
        .filter_module("reqwest", log::LevelFilter::Warn)
        .init();

    let args = match &cli.command {
        Command::Check(args)
        | Command::Resolve(args)
        | Command::Fix(args)
        | Command::Revalidate(args) => args.clone(),
        Command::Progress => RunArgs::default(),
    };
    let config = cli.config(&args)?;
    let pipeline = LinkPipeline::new(config).context("Failed to create HTTP clients")?;

    let summary = match cli.command {
        Command::Check(_) => pipeline.check().await?,
        Command::Resolve(_) => pipeline.resolve_only().await?,
        Command::Fix(_) => pipeline.fix().await?,
        Command::Revalidate(_) => pipeline.revalidate().await?,
        Command::Progress => {
            match pipeline.progress().await? {
                Some(checkpoint) => println!(
                    "{}/{} URLs checked{}",
                    checkpoint.checked,
                    checkpoint.total,
                    if checkpoint.is_complete() { " (complete)" } else { "" }
                ),
                None => println!(
                    "No checkpoint at {}",
                    pipeline.config().progress_path().display()
                ),
            }
            return Ok(());
        }
    };

    print!("{summary}");
    Ok(())
}
