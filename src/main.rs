#![forbid(unsafe_code)]
//! goanno command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use annotation::commands::{execute_extract, execute_init, ExtractOptions, InitOptions};
use annotation::{Config, NodeKind};

#[derive(Parser)]
#[command(name = "goanno")]
#[command(about = "Extract @key value annotations from Go doc comments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = annotation::config::CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the annotations of every documented declaration
    Extract {
        /// Files or directories to scan
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Only show these node kinds (can specify multiple)
        #[arg(short, long = "kind", value_enum)]
        kinds: Vec<KindArg>,

        /// Only show these annotation keys (can specify multiple)
        #[arg(long = "key")]
        keys: Vec<String>,
    },

    /// Write a config file with default settings
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// File patterns to include (can specify multiple)
        #[arg(long)]
        include: Vec<String>,

        /// File patterns to exclude (can specify multiple)
        #[arg(long)]
        exclude: Vec<String>,

        /// Skip _test.go files
        #[arg(long)]
        skip_tests: bool,

        /// Number of parallel workers
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    File,
    Field,
    Func,
    Type,
}

impl From<KindArg> for NodeKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::File => NodeKind::File,
            KindArg::Field => NodeKind::Field,
            KindArg::Func => NodeKind::FuncDecl,
            KindArg::Type => NodeKind::Type,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("annotation={default_level}"))),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract { paths, kinds, keys } => {
            let config = Config::load_or_default(&cli.config)?;
            let options = ExtractOptions {
                paths,
                kinds: kinds.into_iter().map(NodeKind::from).collect(),
                keys,
            };
            execute_extract(options, config)?;
        }

        Commands::Init { force, include, exclude, skip_tests, workers } => {
            let options = InitOptions {
                path: cli.config,
                force,
                include,
                exclude,
                skip_tests,
                workers,
            };
            execute_init(options)?;
        }
    }

    Ok(())
}
