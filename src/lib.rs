pub mod catalog;
pub mod db;
pub mod flow;
pub mod models;
pub mod pairing;
pub mod records;
pub mod runtime;
pub mod settings;
pub mod signal;
pub mod timer;
pub mod utils;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    thread,
};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::sync::mpsc;

use catalog::Collaborators;
use db::Database;
use flow::{Event, JsonLinesPresenter};
use records::SessionRecordStore;
use runtime::SessionRuntime;
use settings::SettingsStore;

const DATA_DIR_ENV: &str = "NEUROFLOW_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "./neuroflow-data";

fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Reads one JSON-encoded [`Event`] per line until stdin closes.
fn spawn_stdin_reader(events: mpsc::UnboundedSender<Event>) -> Result<()> {
    thread::Builder::new()
        .name("neuroflow-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("Failed to read stdin: {err}");
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match serde_json::from_str::<Event>(line) {
                    Ok(event) => {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("Ignoring malformed event {line:?}: {err}"),
                }
            }
        })
        .context("failed to spawn stdin reader")?;
    Ok(())
}

pub async fn run() -> Result<()> {
    utils::logging::init_logging();
    info!("NeuroFlow starting up...");

    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let settings = SettingsStore::new(data_dir.join("settings.json"))?.snapshot();
    let database = Database::new(data_dir.join("neuroflow.sqlite3"))?;

    let history = database.list_records().await?;
    info!("Loaded {} training session(s)", history.len());
    let records = SessionRecordStore::from_history(settings.training.points_per_minute, history);

    let (runtime, events) = SessionRuntime::launch(
        settings,
        Collaborators::demo(),
        Box::new(JsonLinesPresenter),
        records,
        Some(database),
    );
    spawn_stdin_reader(events)?;
    runtime.run().await;
    Ok(())
}
