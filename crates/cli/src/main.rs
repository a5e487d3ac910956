//! Postgen CLI application entry point
//!
//! This is the minimal main entry point that delegates to the library.

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Configure miette for beautiful error reporting
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(false)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))
    .ok();

    let cli = postgen::Cli::parse();

    match postgen::run(cli) {
        Ok(code) => code,
        Err(e) => {
            // Convert anyhow error to miette for beautiful display
            let miette_error = miette::Report::msg(format!("{e:#}"));
            eprintln!("{miette_error:?}");
            ExitCode::FAILURE
        }
    }
}
