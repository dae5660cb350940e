//! bing-search-mcp binary entry point.

use std::process::ExitCode;

use bing_search_mcp::cli::{Cli, execute};
use clap::Parser;

fn main() -> ExitCode {
    // Missing .env is fine; the real environment still applies.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    bing_search_mcp::logging::init(cli.verbose);

    match execute(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                #[allow(clippy::print_stdout)]
                {
                    println!("{output}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
