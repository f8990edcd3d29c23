//! Tripane - A three-pane terminal markdown editor.
//!
//! # Usage
//!
//! ```bash
//! tripane notes/
//! tripane README.md
//! tripane --no-editor --highlight README.md
//! ```

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tripane::app::App;
use tripane::config::{
    ConfigFlags, PreviewTheme, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};

/// A three-pane markdown editor: rich editor, markdown source, and live preview
#[derive(Parser, Debug)]
#[command(name = "tripane", version, about, long_about = None)]
struct Cli {
    /// Markdown file to open or directory to browse
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Start with the rich editor pane hidden
    #[arg(long)]
    no_editor: bool,

    /// Start with the markdown source pane hidden
    #[arg(long)]
    no_raw: bool,

    /// Start with the preview pane hidden
    #[arg(long)]
    no_preview: bool,

    /// Show the markdown source syntax highlighted (read-only)
    #[arg(long)]
    highlight: bool,

    /// Preview and export color scheme
    #[arg(long, value_enum)]
    theme: Option<PreviewTheme>,

    /// Simulated load time of the embedded editor
    #[arg(long, value_name = "MS")]
    renderer_init_ms: Option<u64>,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_ref())?;
    tracing::debug!(?cli, ?effective, "starting tripane");

    if let Some(path) = &cli.path
        && !path.exists()
        && path.extension().is_none()
    {
        anyhow::bail!("Directory not found: {}", path.display());
    }

    let mut app = App::new(cli.path)
        .with_flags(effective)
        .with_config_paths(
            Some(global_path),
            if local_path.exists() {
                Some(local_path)
            } else {
                None
            },
        );

    app.run().context("Application error")
}
