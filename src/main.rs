use anyhow::Context;
use clap::{Parser, ValueEnum};
use logmux::{ConsoleRegistry, Session};
use logmux_core::config::{Config, OutputFormat};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "logmux",
    about = "Follow a structured log file and split it into per-level and per-source sinks"
)]
struct Cli {
    /// Log file to follow.
    file: PathBuf,

    /// Print this sink live (repeatable). Replaces `[console] follow`.
    #[arg(long = "follow", value_name = "SINK")]
    follow: Vec<String>,

    /// Output format for followed sinks.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Watch by polling instead of OS file notifications.
    #[arg(long)]
    poll: bool,

    /// Print per-sink record counts on exit.
    #[arg(long)]
    summary: bool,

    /// Write every sink to `<DIR>/<sink>.log` on exit.
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Write debug logs to /tmp/logmux-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/logmux-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("logmux debug log started, tail -f /tmp/logmux-debug.log");
    }

    let mut config = Config::load().context("loading configuration")?;
    if !cli.follow.is_empty() {
        config.console.follow = cli.follow.clone();
    }
    if let Some(format) = cli.format {
        config.console.format = format.into();
    }
    if cli.poll {
        config.monitor.force_polling = true;
    }

    let console = ConsoleRegistry::new(&config.console);
    let mut session = Session::new(console.clone(), config.monitor.clone());

    session
        .open(&cli.file)
        .await
        .with_context(|| format!("cannot monitor {}", cli.file.display()))?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, shutting down");
            on_interrupt.cancel();
        }
    });

    session.run(cancel).await?;

    if cli.summary {
        print!("{}", session.summary());
    }

    if let Some(dir) = &cli.export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;
        for name in console.names() {
            let path = console
                .export(&name, dir)
                .with_context(|| format!("exporting sink {name}"))?;
            tracing::debug!(sink = %name, path = %path.display(), "exported");
        }
        eprintln!("-- exported {} sinks to {}", console.names().len(), dir.display());
    }

    Ok(())
}
