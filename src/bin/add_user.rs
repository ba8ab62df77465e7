//! Provision a login for the session issuer.
//!
//! ```text
//! add-user <login> <password>
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use mongodb::{options::ClientOptions, Client};
use session_issuer::{
    config::DatabaseConfig,
    credentials::{MongoCredentials, VerifierError},
};

#[derive(Parser, Debug)]
#[command(name = "add-user", about = "Store a login with an argon2 password hash")]
struct Args {
    login: String,
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "add_user=info".into()),
        )
        .init();

    let args = Args::parse();
    let login = args.login.trim();
    if login.is_empty() || args.password.is_empty() {
        bail!("login and password are required");
    }

    let db_cfg = DatabaseConfig::from_env().context("load database config")?;
    let opts = ClientOptions::parse(&db_cfg.mongodb_uri).await?;
    let client = Client::with_options(opts)?;
    let users = MongoCredentials::new(&client.database(&db_cfg.db_name));

    match users.add_user(login, &args.password).await {
        Ok(()) => {
            tracing::info!(login, "user added");
            Ok(())
        }
        Err(VerifierError::Duplicate) => bail!("user {login} already exists"),
        Err(e) => Err(e.into()),
    }
}
