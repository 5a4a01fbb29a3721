//! reltorrent CLI
//!
//! Builds `.torrent` files for release directories and re-targets them at
//! configured trackers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use reltorrent::config::{Config, ConfigError, Overrides, Tracker};
use reltorrent::constants::DEFAULT_CONFIG_FILE;
use reltorrent::metainfo::{retarget_file, BuiltTorrent, Metainfo, PieceSize};

#[derive(Parser)]
#[command(name = "reltorrent", version)]
#[command(about = "Builds BitTorrent metainfo files for music releases")]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a torrent for each file or directory
    Create(CreateArgs),
    /// Copy a torrent with a tracker's announce URL and source tag
    Retarget(RetargetArgs),
    /// Print the contents of a torrent file
    Show {
        torrent: PathBuf,
    },
}

#[derive(Args)]
struct CreateArgs {
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    #[arg(long)]
    announce: Option<String>,

    /// Tracker whose announce URL and source tag to use
    #[arg(long)]
    tracker: Option<Tracker>,

    /// "auto" or a size in KiB
    #[arg(long)]
    piece_size: Option<PieceSize>,

    #[arg(long)]
    comment: Option<String>,

    #[arg(long)]
    source: Option<String>,

    #[arg(long)]
    created_by: Option<String>,

    #[arg(long, conflicts_with = "public")]
    private: bool,

    #[arg(long)]
    public: bool,

    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl CreateArgs {
    fn overrides(&self) -> Overrides {
        let private = match (self.private, self.public) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Overrides {
            announce_url: self.announce.clone(),
            tracker: self.tracker,
            piece_size: self.piece_size,
            comment: self.comment.clone(),
            source: self.source.clone(),
            created_by: self.created_by.clone(),
            private,
            output_dir: self.output_dir.clone(),
        }
    }
}

#[derive(Args)]
struct RetargetArgs {
    torrent: PathBuf,

    #[arg(long)]
    tracker: Tracker,

    /// Announce URL (defaults to the tracker's configured one)
    #[arg(long)]
    announce: Option<String>,

    /// Source tag (defaults to the tracker's source name)
    #[arg(long)]
    source: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref(), DEFAULT_CONFIG_FILE)
        .context("loading configuration")?;
    init_tracing(&config.log_level, cli.verbose);

    match cli.command {
        Command::Create(args) => create(Arc::new(config), args).await,
        Command::Retarget(args) => retarget(&config, args),
        Command::Show { torrent } => show(&torrent),
    }
}

fn init_tracing(base_level: &str, verbose: u8) {
    let level = match verbose {
        0 => base_level,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn create(config: Arc<Config>, args: CreateArgs) -> anyhow::Result<()> {
    let overrides = Arc::new(args.overrides());
    let total = args.paths.len();

    // Builds share nothing, so each path hashes on its own blocking thread.
    let tasks = args.paths.into_iter().map(|path| {
        let config = Arc::clone(&config);
        let overrides = Arc::clone(&overrides);
        tokio::task::spawn_blocking(move || {
            let result = build_one(&config, &overrides, &path);
            (path, result)
        })
    });

    let mut failed = 0;
    for joined in futures::future::join_all(tasks).await {
        let (path, result) = joined.context("torrent build task panicked")?;
        match result {
            Ok(built) => {
                info!(
                    input = %path.display(),
                    pieces = built.metainfo.info.piece_count(),
                    piece_length = built.metainfo.info.piece_length,
                    "torrent created"
                );
                println!("{}\t{}", built.metainfo.info_hash, built.path.display());
            }
            Err(e) => {
                error!(input = %path.display(), "{:#}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} torrents failed", failed, total);
    }
    Ok(())
}

fn build_one(config: &Config, overrides: &Overrides, path: &Path) -> anyhow::Result<BuiltTorrent> {
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let request = config
        .request(&path, overrides)
        .with_context(|| format!("preparing {}", path.display()))?;
    let output_dir = config.output_dir_for(&path, overrides);

    request
        .write_to(&output_dir)
        .with_context(|| format!("building torrent for {}", path.display()))
}

fn retarget(config: &Config, args: RetargetArgs) -> anyhow::Result<()> {
    let tracker_cfg = config.tracker(args.tracker)?;

    // Never fall back to the global announce URL here: the copy must point at this tracker.
    let announce = args
        .announce
        .or_else(|| tracker_cfg.and_then(|cfg| cfg.announce_url.clone()))
        .filter(|url| !url.trim().is_empty())
        .ok_or(ConfigError::MissingAnnounce)
        .with_context(|| format!("no announce URL for tracker {}", args.tracker))?;

    let source = match args.source {
        Some(source) => Some(source),
        None => config.resolve_source(Some(args.tracker))?,
    };

    let path = retarget_file(
        &args.torrent,
        args.tracker.id(),
        &announce,
        source.as_deref(),
    )
    .with_context(|| format!("re-targeting {}", args.torrent.display()))?;

    info!(tracker = args.tracker.display_name(), "torrent re-targeted");
    println!("{}", path.display());
    Ok(())
}

fn show(torrent: &Path) -> anyhow::Result<()> {
    let data =
        std::fs::read(torrent).with_context(|| format!("reading {}", torrent.display()))?;
    let metainfo = Metainfo::from_bytes(&data)
        .with_context(|| format!("parsing {}", torrent.display()))?;
    let info = &metainfo.info;

    println!("name:         {}", info.name);
    println!("info hash:    {}", metainfo.info_hash);
    println!("announce:     {}", metainfo.announce);
    println!("piece length: {}", info.piece_length);
    println!("pieces:       {}", info.piece_count());
    println!("total size:   {}", info.total_length());
    println!("private:      {}", info.private);
    if let Some(ref source) = info.source {
        println!("source:       {}", source);
    }
    if let Some(ref comment) = metainfo.comment {
        println!("comment:      {}", comment);
    }
    if let Some(ref created_by) = metainfo.created_by {
        println!("created by:   {}", created_by);
    }
    println!("files:");
    for file in info.files() {
        println!("  {:>12}  {}", file.length, file.path.join("/"));
    }

    Ok(())
}
