pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "taskboard-api")]
#[command(about = "Taskboard API - multi-user project and task tracker")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create a user account directly in the store")]
    CreateUser(commands::user::CreateUserArgs),
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve(Default::default())) {
        Commands::Serve(args) => commands::serve::handle(args, config).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::CreateUser(args) => commands::user::handle(args, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["taskboard-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_create_user() {
        let cli = Cli::try_parse_from([
            "taskboard-api",
            "create-user",
            "--username",
            "alice",
            "--password",
            "pw1",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateUser(args)) => {
                assert_eq!(args.username, "alice");
                assert!(args.email.is_none());
            }
            _ => panic!("expected create-user"),
        }
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["taskboard-api", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.host.is_none());
            }
            _ => panic!("expected serve"),
        }
    }
}
