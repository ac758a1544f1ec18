mod config;
mod render;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::Level;

use board::{BufferedNotifier, Notice, PipelineController};
use entity::{NewDeal, Stage};
use platform_records::{HttpRecordStore, MemRecordStore, RecordStore};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "dealdeck", version, about = "Dealdeck CRM pipeline board")]
struct Cli {
    /// Use a seeded in-memory store instead of the hosted platform.
    #[arg(long, global = true)]
    demo: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Render the pipeline board.
    Board,
    /// Move a deal to another stage.
    Move {
        #[arg(long)]
        deal: i64,
        #[arg(long)]
        stage: Stage,
    },
    /// Add a deal to the pipeline.
    AddDeal {
        #[arg(long)]
        title: String,
        #[arg(long)]
        value: f64,
        #[arg(long)]
        contact: i64,
        #[arg(long, default_value = "Lead")]
        stage: Stage,
    },
    /// List the audit activity log.
    Activities {
        #[arg(long)]
        deal: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let store: Arc<dyn RecordStore> = if cli.demo {
        Arc::new(MemRecordStore::with_demo_data())
    } else {
        let config = AppConfig::load()?;
        Arc::new(HttpRecordStore::new(config.base_url, config.api_key))
    };

    let notifier = Arc::new(BufferedNotifier::new());
    let mut controller = PipelineController::new(store, notifier.clone());
    controller.load().await?;

    match cli.cmd {
        Cmd::Board => print!("{}", render::board(controller.state())),
        Cmd::Move { deal, stage } => {
            controller.move_deal_stage(deal, stage).await?;
        }
        Cmd::AddDeal {
            title,
            value,
            contact,
            stage,
        } => {
            controller
                .add_deal(&NewDeal {
                    title,
                    value,
                    stage,
                    contact_id: contact,
                })
                .await?;
        }
        Cmd::Activities { deal } => print!("{}", render::activities(controller.state(), deal)),
    }

    for notice in notifier.drain() {
        match notice {
            Notice::Success(message) => println!("ok: {message}"),
            Notice::Error(message) => eprintln!("error: {message}"),
        }
    }
    Ok(())
}
