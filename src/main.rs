//! `stormgen` - lightning storm test-data generator

use clap::Parser;

use stormgen::cli::args::Cli;
use stormgen::cli::commands;
use stormgen::error::ExitCode;
use stormgen::observability::init_logging;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                ExitCode::USAGE_ERROR
            } else {
                ExitCode::SUCCESS
            };
            std::process::exit(code);
        }
    };

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            for issue in e.issues() {
                eprintln!("  {issue}");
            }
            std::process::exit(e.exit_code());
        }
    }
}
