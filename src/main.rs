use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

use nilai_store::{
    api::{init_db, NilaiModel},
    cli::{self, Cli},
    config::Config,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = cli.database {
        config.database_url = url;
    }
    if cli.verbose {
        config.log_level = LevelFilter::Debug;
    }

    // logs go to stderr so stdout stays plain JSON
    let log_config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    if let Err(e) = TermLogger::init(
        config.log_level,
        log_config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to init logger: {}", e);
    }

    let pool = match init_db(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let model = NilaiModel::new(pool);

    match cli::execute(cli.command, &model).await {
        Ok(outcome) if outcome.success => {
            println!("{}", outcome.output);
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            eprintln!("{}", outcome.output);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
