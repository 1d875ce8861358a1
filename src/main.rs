// cexplore: interactive explorer for the values and types of a C program image

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cexplore::commands::{Command, Flow};
use cexplore::console::StdConsole;
use cexplore::inspect::ProgramImage;

const PROMPT: &str = "(cexplore) ";

/// Explore the values and types of a C program image
#[derive(Debug, Parser)]
#[command(name = "cexplore", version, about)]
struct Cli {
    /// C declaration file describing the program image
    file: PathBuf,

    /// Run COMMAND after loading the image (may be repeated)
    #[arg(short = 'x', long = "exec", value_name = "COMMAND")]
    exec: Vec<String>,

    /// Exit after the --exec commands instead of starting the prompt
    #[arg(long)]
    batch: bool,

    /// Log debug events to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs go to stderr so they never interleave with the exploration transcript
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parse and run one command line, reporting errors on the console
fn run_line(image: &ProgramImage, console: &mut StdConsole, line: &str) -> Flow {
    match Command::parse(line).and_then(|command| command.execute(image, console)) {
        Ok(flow) => flow,
        Err(err) => {
            console.error(&err.to_string());
            Flow::Continue
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read '{}'", cli.file.display()))?;
    let image = ProgramImage::load(&source)
        .with_context(|| format!("Failed to load '{}'", cli.file.display()))?;

    let mut console = StdConsole::new();

    for line in &cli.exec {
        if run_line(&image, &mut console, line) == Flow::Quit {
            return Ok(());
        }
    }
    if cli.batch {
        return Ok(());
    }

    while let Some(line) = console.read_command(PROMPT) {
        if run_line(&image, &mut console, &line) == Flow::Quit {
            break;
        }
    }

    Ok(())
}
