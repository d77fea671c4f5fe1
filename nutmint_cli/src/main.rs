use clap::Parser;
use nutmint_cli::commands::{bootstrap, check_state, init, list_keysets, rotate};
use nutmint_cli::config::{CliCommand, Config};
use nutmint_cli::demo::run_demo;

#[tokio::main]
async fn main() {
    env_logger::init();
    let config: Config = Config::parse();
    let (global_options, command) = config.to_parts();

    let result = match command {
        CliCommand::Init(cmd) => init(&global_options, cmd),
        CliCommand::Bootstrap => bootstrap(&global_options),
        CliCommand::Keysets => list_keysets(&global_options),
        CliCommand::Rotate(cmd) => rotate(&global_options, cmd),
        CliCommand::CheckState { ys } => check_state(&global_options, &ys),
        CliCommand::Demo(cmd) => run_demo(&global_options, cmd).await,
    };

    if let Err(err) = result {
        eprintln!("** Error ** \n {err}");
        std::process::exit(1);
    }
}
