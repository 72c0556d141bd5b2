use std::process::ExitCode;

use clap::Parser;

mod app;
mod camera;
mod cli;
mod input;
mod render;
mod scene;
mod shader;

pub fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli::initialize_tracing(&cli.log_filter, cli.log_format);
    tracing::debug!(?cli);

    match app::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

/// `e` followed by each of its sources.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut res = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        res.push_str(": ");
        res.push_str(&s.to_string());
        source = s.source();
    }
    res
}
