mod error;
mod paging;
mod sim;

use std::io::{self, BufWriter};
use std::path::Path;
use std::process::ExitCode;

use sim::config::{CONFIG_FILE, Config};
use sim::driver::SimulationDriver;
use sim::report::TextReporter;
use sim::trace::read_tokens;
use tracing_subscriber::{EnvFilter, fmt};

/// environment variable selecting the log format, `json` or the default compact one
const LOG_FORMAT_ENV: &str = "PAGING_LOG_FORMAT";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var(LOG_FORMAT_ENV).is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn simulate(config: &Config, verbose: bool) -> error::Result<()> {
    let reporter = TextReporter::new(BufWriter::new(io::stdout().lock()), verbose);
    let mut driver = SimulationDriver::new(config, reporter)?;
    driver.run(config, read_tokens(io::stdin().lock()))?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    // bad invocations never reach the simulation
    let options = match sim::cli::parse_args(std::env::args_os()) {
        Ok(options) => options,
        Err(e) => e.exit(),
    };

    let (config, warnings) = Config::load(Path::new(CONFIG_FILE));
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    match simulate(&config, options.verbose) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
