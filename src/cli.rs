use crate::{
    config::Config,
    engine::{LazyEngine, MupdfEngine},
    reader::Reader,
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_CONFIG: &str = "pdf-page-cache.toml";

#[derive(Parser, Debug)]
#[command(name = "pdf-page-cache")]
#[command(about = "Read PDF pages as text or cached page images")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./pdf-page-cache.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Page count, metadata and a per-page preview.
    Info {
        #[arg(long)]
        input: PathBuf,
    },
    /// Plain text of a page range.
    Text {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        end: Option<u32>,
    },
    /// Render one page as an image.
    Page {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        page: u32,
    },
    /// Render every page of a range as images.
    All {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        end: Option<u32>,
    },
    /// Text for plain pages, images for pages with pictures or drawings.
    Smart {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        end: Option<u32>,
    },
    /// Render one page at a chosen resolution.
    Render {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        page: u32,
        #[arg(long)]
        dpi: Option<u32>,
    },
    /// Delete the document's page cache.
    ClearCache {
        #[arg(long)]
        input: PathBuf,
        /// Only report what would be deleted.
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            let _ = init_logging(&args, &Config::default(), None);
            return Err(err);
        }
    };
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    let engine = Arc::new(LazyEngine::new(|| {
        Ok::<_, crate::Error>(MupdfEngine::new())
    }));
    let reader = Reader::new(&cfg, engine);
    let json = args.json || cfg.output.json;

    match &args.cmd {
        Command::Info { input } => {
            let out = reader
                .summary(input)
                .with_context(|| format!("info {}", input.display()))?;
            emit(json, &out)
        }
        Command::Text { input, start, end } => {
            let out = reader
                .text(input, *start, *end)
                .with_context(|| format!("text {}", input.display()))?;
            emit(json, &out)
        }
        Command::Page { input, page } => {
            let out = reader
                .page(input, *page)
                .with_context(|| format!("page {} of {}", page, input.display()))?;
            emit(json, &out)
        }
        Command::All { input, start, end } => {
            let out = reader
                .all_pages(input, *start, *end)
                .with_context(|| format!("all pages of {}", input.display()))?;
            emit(json, &out)
        }
        Command::Smart { input, start, end } => {
            let out = reader
                .smart(input, *start, *end)
                .with_context(|| format!("smart read of {}", input.display()))?;
            emit(json, &out)
        }
        Command::Render { input, page, dpi } => {
            let out = reader
                .render_page(input, *page, *dpi)
                .with_context(|| format!("render page {} of {}", page, input.display()))?;
            emit(json, &out)
        }
        Command::ClearCache { input, dry_run } => {
            let out = reader
                .clear_cache(input, *dry_run)
                .with_context(|| format!("clear cache of {}", input.display()))?;
            emit(json, &out)
        }
    }
}

fn emit<T: Serialize + Display>(json: bool, value: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{value}");
    }
    Ok(())
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    if default.exists() {
        Config::load(&default)
    } else {
        Ok(Config::default())
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output; logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("pdf-page-cache.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_render_subcommand() {
        let args = Args::try_parse_from([
            "pdf-page-cache",
            "render",
            "--input",
            "doc.pdf",
            "--page",
            "3",
            "--dpi",
            "300",
            "--json",
        ])
        .unwrap();
        assert!(args.json);
        match args.cmd {
            Command::Render { input, page, dpi } => {
                assert_eq!(input, PathBuf::from("doc.pdf"));
                assert_eq!(page, 3);
                assert_eq!(dpi, Some(300));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn clear_cache_defaults_to_real_delete() {
        let args =
            Args::try_parse_from(["pdf-page-cache", "clear-cache", "--input", "doc.pdf"]).unwrap();
        assert!(matches!(args.cmd, Command::ClearCache { dry_run: false, .. }));
    }
}
