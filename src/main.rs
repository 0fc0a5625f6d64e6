use std::io;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use pcf::cli_app::{handle_command, init_config, Cli, Commands};
use pcf::config::Config;
use pcf::external_api::paperless_api::PaperlessApi;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => match init_config(io::stdin().lock(), io::stdout()) {
            Ok(value) => println!("{}", value),
            Err(e) => {
                eprintln!("Failed to create config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Commands::Fields(args) => {
            let config = match Config::load() {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::FAILURE;
                }
            };
            let api = match PaperlessApi::new(&config.paperless_api_token, &config.paperless_base_url) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("Failed to create the API client: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            if handle_command(args, &api, config.page_size, io::stdin(), io::stdout()).await.is_err() {
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
