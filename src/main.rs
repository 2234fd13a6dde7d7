use anyhow::Result;
use clap::Parser;
use swarmboard::ingest::discovery::resolve_project_root;
use swarmboard::{config, tui};

#[derive(Parser, Debug)]
#[command(name = "swarmboard")]
#[command(about = "Terminal dashboard for agent invocation logs")]
#[command(version)]
struct Args {
    /// Time filter: today, yesterday, 6h, 7d, YYYY-MM-DD, or
    /// "YYYY-MM-DD HH:MM:SS"
    #[arg(long)]
    since: Option<String>,

    /// Project root to analyze (defaults to the current directory)
    #[arg(long)]
    project: Option<std::path::PathBuf>,

    /// Color theme to start with
    #[arg(long)]
    theme: Option<String>,

    /// Path to config file
    #[arg(long, short)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("swarmboard=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(args.config.as_deref())?;

    // The only fatal startup error: an unresolvable project path.
    let project_root = resolve_project_root(args.project.as_deref())
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let theme = args
        .theme
        .or_else(|| {
            if config.ui.theme.is_empty() {
                None
            } else {
                Some(config.ui.theme.clone())
            }
        })
        .unwrap_or_else(|| "dracula".to_string());

    let options = tui::AppOptions {
        project_root,
        since: args.since,
        theme,
        home_override: None,
        default_range: Some(config.analysis.default_range.clone()),
    };

    tui::run(options).await
}
