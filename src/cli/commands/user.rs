use anyhow::Context;
use clap::Args;

use crate::api::payload::RegisterPayload;
use crate::config::AppConfig;
use crate::database::open_store;
use crate::services::AccountService;

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    #[arg(long, help = "Login name")]
    pub username: String,

    #[arg(long, help = "Optional email address")]
    pub email: Option<String>,

    #[arg(long, help = "Password (stored as a bcrypt hash)")]
    pub password: String,
}

pub async fn handle(args: CreateUserArgs, config: AppConfig) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL must be set; an in-memory account would vanish on exit");
    }

    let registration = RegisterPayload {
        username: Some(args.username),
        email: args.email,
        password: Some(args.password),
    }
    .validate()
    .map_err(|e| anyhow::anyhow!("{}", e.to_json()))?;

    let store = open_store(&config).await.context("failed to open record store")?;
    let accounts = AccountService::new(store, config.security.bcrypt_cost);
    let user = accounts.register(registration).await?;

    println!("Created user {} (id {})", user.username, user.id);
    Ok(())
}
