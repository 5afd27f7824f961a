/*!
 * Command-line interface for filefacts
 */

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use filefacts::config::{Args, Config};
use filefacts::report::Reporter;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    // Shell completions short-circuit everything else
    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "filefacts", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    // Create configuration
    let config = Config::from_args(args);
    init_logging(&config);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> filefacts::Result<()> {
    // Validate configuration
    let fact = config.validate()?;

    if config.print_command {
        println!("{}", fact.command());
        return Ok(());
    }

    debug!("Gathering {:?} on {:?}", fact, config.target);
    let executor = config.executor();
    let report = fact.gather(executor.as_ref())?;

    Reporter::new(config.format).print_report(&report)
}

/// Log to stderr so stdout only carries the report
fn init_logging(config: &Config) {
    let filter = match config.log_filter() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
