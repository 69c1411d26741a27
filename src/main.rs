//! sol-store operator binary

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sol_store::{
    config::{self, AgreementCommand, Args, Command, TfaCommand},
    db::MongoStore,
    tfa::TfaSummary,
    Repositories,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = config::load_env_file();
    let args = Args::parse();

    let log_level = args.log_level.to_lowercase();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("sol_store={},info", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    let store = MongoStore::connect(&args.mongodb_uri, &args.mongodb_db).await?;
    let repos = Repositories::new(Arc::new(store), args.reference_checks);

    run(&repos, args.command).await
}

async fn run(repos: &Repositories, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Agreements(cmd) => match cmd {
            AgreementCommand::List => print(&repos.agreements.find_all().await?),
            AgreementCommand::Show { id } => print(&repos.agreements.find_by_id(&id).await?),
            AgreementCommand::Delete { id } => print(&repos.agreements.delete_by_id(&id).await?),
            AgreementCommand::ForManager { manager_id } => print(
                &repos
                    .agreements
                    .find_for_general_manager(&manager_id)
                    .await?,
            ),
            AgreementCommand::ForAssociation { association_id } => print(
                &repos
                    .agreements
                    .find_for_association(&association_id)
                    .await?,
            ),
            AgreementCommand::SetManager { id, manager_id } => {
                print(&repos.agreements.add_manager(&id, &manager_id).await?)
            }
        },
        Command::Tfa(cmd) => match cmd {
            TfaCommand::Show { user_id } => {
                let binding = repos.tfa.get_by_user_id(&user_id).await?;
                print(&binding.as_ref().map(TfaSummary::from))
            }
            TfaCommand::Delete { user_id } => {
                print(&TfaSummary::from(&repos.tfa.delete(&user_id).await?))
            }
        },
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
