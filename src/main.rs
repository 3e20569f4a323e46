use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vecbench::report::{render_report, ChartPaths, ChartTheme};
use vecbench::{run_all, BenchConfig};

#[derive(Parser, Debug)]
#[command(name = "vecbench")]
#[command(about = "Benchmark vector databases and chart the results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render charts from a results JSON file
    Plot {
        /// Results document written by `vecbench run`
        metrics: PathBuf,

        /// Output prefix; writes <prefix>_bars.png, <prefix>_latency.png and <prefix>.png
        output_prefix: PathBuf,

        /// Chart color theme
        #[arg(long, value_enum, default_value_t = Theme::Cyberpunk)]
        theme: Theme,
    },

    /// Run the benchmark workload against the configured databases
    Run {
        /// TOML configuration file (VECBENCH_* environment variables still apply)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the results document (overrides the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also render charts with this output prefix
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Chart color theme, used with --plot
        #[arg(long, value_enum, default_value_t = Theme::Cyberpunk)]
        theme: Theme,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Theme {
    Cyberpunk,
    Light,
}

impl From<Theme> for ChartTheme {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Cyberpunk => ChartTheme::cyberpunk(),
            Theme::Light => ChartTheme::light(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plot {
            metrics,
            output_prefix,
            theme,
        } => plot(&metrics, &output_prefix, theme),
        Commands::Run {
            config,
            output,
            plot: plot_prefix,
            theme,
        } => {
            let results = run(config.as_deref(), output)?;
            match plot_prefix {
                Some(prefix) => plot(&results, &prefix, theme),
                None => Ok(()),
            }
        }
    }
}

/// Render charts and list the written files
fn plot(metrics: &Path, output_prefix: &Path, theme: Theme) -> Result<()> {
    let paths = render_report(metrics, output_prefix, &theme.into())?;
    print_saved(&paths);
    Ok(())
}

/// Run the benchmark and return the path of the results document
fn run(config_path: Option<&Path>, output: Option<PathBuf>) -> Result<PathBuf> {
    let mut config = BenchConfig::load(config_path)?;
    if let Some(output) = output {
        config.output = output;
    }

    let rt = tokio::runtime::Runtime::new()?;
    let doc = rt.block_on(run_all(&config))?;

    doc.save(&config.output)
        .with_context(|| format!("failed to write results to {}", config.output.display()))?;
    info!(path = %config.output.display(), databases = doc.len(), "results written");

    Ok(config.output)
}

fn print_saved(paths: &ChartPaths) {
    println!("Saved:");
    for path in [&paths.bars, &paths.latency, &paths.combined] {
        println!("- {}", path.display());
    }
}
