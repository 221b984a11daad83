//! Terminal dashboard for litter logs.
//!
//! Signs the user in against a locally cached profile and prints the
//! enriched litter log table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use litterlog::config::{Config, DEFAULT_SESSION_PATH};
use litterlog::session::{FileStorage, SessionStore, UserVerifier};
use litterlog::view::{check_session, sign_out, LogTable, SessionGate, SIGN_IN_ROUTE};
use litterlog::{Cancelled, LitterLogPipeline, User};

#[derive(Parser, Debug)]
#[command(name = "litterlog")]
#[command(about = "Litter log dashboard")]
struct Args {
    /// TOML config file (otherwise read from the environment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Session file, overriding the configured one
    #[arg(long, env = "SESSION_PATH", global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show recent litter logs with resolved addresses
    Logs {
        /// Print enriched records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Cache a user profile as the current session
    Login {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Clear the cached session
    Logout,
    /// Show and validate the cached session
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so the table can be piped
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    match &args.command {
        Command::Login {
            name,
            email,
            image_url,
        } => {
            let config = file_config(&args)?;
            let mut store = open_store(&args, config.as_ref());
            store.save(User {
                name: name.clone(),
                email: email.clone(),
                image_url: image_url.clone(),
            })?;
            println!("Signed in as {} <{}>", name, email);
        }
        Command::Logout => {
            let config = file_config(&args)?;
            let mut store = open_store(&args, config.as_ref());
            sign_out(&mut store)?;
            println!("Signed out. Next: {}", SIGN_IN_ROUTE);
        }
        Command::Whoami => {
            let config = load_config(&args)?;
            let mut store = open_store(&args, Some(&config));
            match gate(&mut store, &config).await? {
                SessionGate::Authenticated(user) => {
                    println!("{} <{}>", user.name, user.email);
                    if !user.image_url.is_empty() {
                        println!("{}", user.image_url);
                    }
                }
                SessionGate::RedirectToSignIn => println!("Not signed in. Next: {}", SIGN_IN_ROUTE),
            }
        }
        Command::Logs { json } => {
            let config = load_config(&args)?;
            let mut store = open_store(&args, Some(&config));
            let user = match gate(&mut store, &config).await? {
                SessionGate::Authenticated(user) => user,
                SessionGate::RedirectToSignIn => {
                    anyhow::bail!("Not signed in; run `litterlog login` ({})", SIGN_IN_ROUTE)
                }
            };
            info!("Hello, {}", user.name);

            run_logs(&config, *json).await?;
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::from_env().context("Failed to read configuration from environment"),
    }
}

/// Session-only commands need no backend settings, so the environment is
/// not consulted; an explicit `--config` file still decides the session path.
fn file_config(args: &Args) -> Result<Option<Config>> {
    args.config.as_ref().map(|_| load_config(args)).transpose()
}

/// `--session` (or `SESSION_PATH`) wins, then the config, then the default.
fn session_path(args: &Args, config: Option<&Config>) -> PathBuf {
    args.session
        .clone()
        .or_else(|| config.map(|c| c.session_path.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH))
}

fn open_store(args: &Args, config: Option<&Config>) -> SessionStore<FileStorage> {
    SessionStore::new(FileStorage::new(session_path(args, config)))
}

async fn gate(store: &mut SessionStore<FileStorage>, config: &Config) -> Result<SessionGate> {
    let verifier = UserVerifier::new(
        &config.backend_url,
        std::time::Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(check_session(store, &verifier).await?)
}

async fn run_logs(config: &Config, json: bool) -> Result<()> {
    let pipeline =
        LitterLogPipeline::from_config(config).context("Failed to build HTTP clients")?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    if !json {
        eprintln!("{}", LogTable::Loading.render());
    }

    let records = match pipeline.load(&cancel).await {
        Ok(records) => records,
        Err(Cancelled) => {
            warn!("Interrupted before all addresses resolved");
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        println!("LITTER LOGS");
        println!("{}", LogTable::ready(&records).render());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_config(dir: &Path, session: &Path) -> PathBuf {
        let path = dir.join("litterlog.toml");
        let toml = format!(
            "backend_url = \"http://localhost:5000\"\n\
             geocode_api_key = \"test-key\"\n\
             session_path = \"{}\"\n",
            session.display()
        );
        std::fs::write(&path, toml).unwrap();
        path
    }

    #[test]
    fn test_login_uses_configured_session_path() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("configured-session.json");
        let config_path = write_config(dir.path(), &session);

        let args = Args::try_parse_from([
            "litterlog",
            "-c",
            config_path.to_str().unwrap(),
            "login",
            "--name",
            "Asha Rao",
            "--email",
            "asha@example.com",
        ])
        .unwrap();
        if args.session.is_some() {
            // SESSION_PATH is set in this environment and takes precedence.
            return;
        }

        let config = file_config(&args).unwrap();
        assert_eq!(session_path(&args, config.as_ref()), session);

        let mut store = open_store(&args, config.as_ref());
        store
            .save(User {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                image_url: String::new(),
            })
            .unwrap();
        assert!(session.exists());
    }

    #[test]
    fn test_session_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), &dir.path().join("configured.json"));
        let explicit = dir.path().join("explicit.json");

        let args = Args::try_parse_from([
            "litterlog",
            "-c",
            config_path.to_str().unwrap(),
            "--session",
            explicit.to_str().unwrap(),
            "logout",
        ])
        .unwrap();

        let config = file_config(&args).unwrap();
        assert_eq!(session_path(&args, config.as_ref()), explicit);
    }

    #[test]
    fn test_no_config_file_skips_environment() {
        let args = Args::try_parse_from(["litterlog", "logout"]).unwrap();
        assert!(file_config(&args).unwrap().is_none());
    }
}
