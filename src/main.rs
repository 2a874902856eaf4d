use bundle_site::{config, output, walk};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// File the built site model is written to, inside the output directory.
const MODEL_FILE: &str = "site.json";

#[derive(Parser)]
#[command(name = "bundle-site")]
#[command(about = "Build a site model from a tree of textbundles")]
#[command(long_about = "\
Build a site model from a tree of textbundles

Every folder ending in .textbundle is one document: a text.md main file plus
an optional assets/ folder. Folders are classified by where they sit:

  content/
  ├── config.toml                  # Site config (optional)
  ├── index.textbundle/            # Home content
  ├── about.textbundle/            # Top-level page `about`
  ├── posts/                       # Listed in `sections` → section
  │   ├── index.textbundle/        # Section content
  │   ├── hello.textbundle/        # Item `hello`
  │   └── 2024/recap.textbundle/   # Item `2024/recap`
  └── notes/                       # Anything else → page container
      └── x.textbundle/            # Page `notes/x`

Field resolution (first available wins):
  Title:         `title` metadata → first # heading → bundle name
  Date:          `date` metadata → file modification time → now
  Last modified: file modification time → date

Assets are copied to <output>/<path>/assets/. The model is written to
<output>/site.json.

Run 'bundle-site gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log progress (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the content tree, copy assets and write the site model
    Build,
    /// Walk the content tree and report errors without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build => {
            println!("==> Building {}", cli.source.display());
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);

            let model = walk::build(&cli.source, &cli.output, &site_config, false)?;
            output::print_build_output(&model, false);

            std::fs::create_dir_all(&cli.output)?;
            let model_path = cli.output.join(MODEL_FILE);
            let json = serde_json::to_string_pretty(&model)?;
            std::fs::write(&model_path, json)?;
            println!("==> Build complete: {}", model_path.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);

            let model = walk::build(&cli.source, &cli.output, &site_config, true)?;
            output::print_build_output(&model, true);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `--verbose` logs at `info`; otherwise `RUST_LOG` decides, defaulting to
/// warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores: users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
