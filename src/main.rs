use std::process::ExitCode;

use check_systemd::{
    config::{Cli, Config, ConfigError, OutputFormat},
    errors::CheckError,
    execute, logging,
    report::render,
    unit_source, CheckOutcome,
};
use clap::{error::ErrorKind, Parser};
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let err = CheckError::from(ConfigError::InvalidArguments(
                err.to_string().trim().to_string(),
            ));
            return finish(&CheckOutcome::unknown(&err), OutputFormat::Text);
        }
    };

    let format = cli.format;
    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(err) => return finish(&CheckOutcome::unknown(&CheckError::from(err)), format),
    };
    debug!(?config, "starting check");

    let source = unit_source(&config);
    let outcome = execute(source.as_ref(), &config).await;
    finish(&outcome, config.format)
}

fn finish(outcome: &CheckOutcome, format: OutputFormat) -> ExitCode {
    println!("{}", render(outcome, format));
    ExitCode::from(outcome.severity.exit_code())
}
