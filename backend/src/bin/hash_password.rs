//! Hash a password for the user store, optionally emitting a seed entry or
//! upserting the user into PostgreSQL.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, BufRead};

use clap::Parser;
use feedback_board::domain::ports::UserRepository;
use feedback_board::domain::{DisplayName, EmailAddress, User, UserId, UserParts};
use feedback_board::outbound::credentials::Sha256PasswordHasher;
use feedback_board::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, apply_migrations,
};
use tokio::runtime::Builder;

/// `hash-password` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hash-password",
    about = "Hash a password and optionally provision the matching user",
    version
)]
struct CliArgs {
    /// Password to hash. Read from the first line of stdin when omitted.
    #[arg(long = "password", value_name = "password")]
    password: Option<String>,
    /// Email address of the user to provision.
    #[arg(long = "email", value_name = "email", requires = "display_name")]
    email: Option<String>,
    /// Display name of the user to provision.
    #[arg(long = "display-name", value_name = "name", requires = "email")]
    display_name: Option<String>,
    /// Grant the administrator role.
    #[arg(long = "admin", requires = "email")]
    admin: bool,
    /// Upsert the user into this database instead of printing a seed entry.
    #[arg(long = "database-url", value_name = "url", requires = "email")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let password = match args.password.clone() {
        Some(password) => password,
        None => read_password_line(io::stdin().lock())?,
    };

    let credential_hash = Sha256PasswordHasher::new()
        .hash(&password)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    let (Some(email), Some(display_name)) = (args.email.clone(), args.display_name.clone()) else {
        println!("{}", credential_hash.as_ref());
        return Ok(());
    };

    let user = User::new(UserParts {
        id: UserId::random(),
        display_name: DisplayName::new(display_name)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?,
        email: EmailAddress::new(email)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?,
        credential_hash,
        is_admin: args.admin,
    });

    match args.database_url {
        Some(url) => {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
            runtime.block_on(upsert_user(&url, &user))?;
            println!("upserted user {}", user.id());
        }
        None => println!("{}", seed_entry(&user)),
    }
    Ok(())
}

fn read_password_line(mut input: impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "password must not be empty",
        ));
    }
    Ok(password.to_owned())
}

fn seed_entry(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id().to_string(),
        "displayName": user.display_name().as_ref(),
        "email": user.email().as_ref(),
        "credentialHash": user.credential_hash().as_ref(),
        "isAdmin": user.is_admin(),
    })
}

async fn upsert_user(database_url: &str, user: &User) -> io::Result<()> {
    apply_migrations(database_url)
        .await
        .map_err(|error| io::Error::other(format!("apply migrations: {error}")))?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    DieselUserRepository::new(pool)
        .upsert(user)
        .await
        .map_err(|error| io::Error::other(format!("upsert user: {error}")))
}
