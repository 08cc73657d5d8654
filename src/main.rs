use clap::Parser;
use strategist::cli::{self, CheckCommand, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => cli::run::execute(&args).await,
        Commands::Check(CheckCommand::Config(arg)) => cli::check::execute_config(&arg.config),
        Commands::Strategies => {
            cli::strategies::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
