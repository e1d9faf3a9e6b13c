//! engram CLI: manage per-user memories from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use std::path::PathBuf;
use uuid::Uuid;

use engram_rs::config::{self, StorageBackendKind};
use engram_rs::core::MemoryEngine;
use engram_rs::memory::model::METADATA_CATEGORY_KEY;

#[derive(Parser)]
#[command(name = "engram", version, about = "Per-user memory store for LLM applications")]
struct Cli {
    /// Path to a JSON5 config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend override.
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,

    /// Store path override.
    #[arg(long, global = true)]
    path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Disk,
    Sqlite,
    Ephemeral,
}

impl From<BackendArg> for StorageBackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Disk => StorageBackendKind::Disk,
            BackendArg::Sqlite => StorageBackendKind::Sqlite,
            BackendArg::Ephemeral => StorageBackendKind::Ephemeral,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Store a new memory.
    Add {
        text: String,
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "general")]
        category: String,
    },
    /// List every memory for a user.
    List {
        #[arg(long)]
        user: String,
    },
    /// Search a user's memories by similarity.
    Search {
        query: String,
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 5)]
        num_results: usize,
    },
    /// Replace a memory's text.
    Update {
        id: Uuid,
        text: String,
        #[arg(long)]
        user: String,
    },
    /// Delete one memory.
    Delete {
        id: Uuid,
        #[arg(long)]
        user: String,
    },
    /// Delete every memory for a user.
    DeleteAll {
        #[arg(long)]
        user: String,
    },
    /// Delete every memory in the store.
    Reset,
    /// Rewrite a stored memory through the configured LLM.
    Enhance {
        id: Uuid,
        #[arg(long)]
        user: String,
    },
    /// Summarize a user's memories through the configured LLM.
    Summarize {
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    engram_rs::init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::default_config(),
    };
    if let Some(backend) = cli.backend {
        config.storage.backend = backend.into();
    }
    if let Some(path) = cli.path {
        config.storage.path = Some(path);
    }

    let engine = MemoryEngine::from_config(&config)?;
    match cli.command {
        Command::Add {
            text,
            user,
            category,
        } => {
            let mut metadata = Map::new();
            metadata.insert(METADATA_CATEGORY_KEY.to_string(), Value::String(category));
            let record = engine.add(&text, &user, Some(metadata)).await?;
            println!("added {} for {}", record.id, record.user_id);
        }
        Command::List { user } => {
            for view in engine.get_all(&user)? {
                println!("{}  {}", view.id, view.text);
            }
        }
        Command::Search {
            query,
            user,
            num_results,
        } => {
            for hit in engine.search(&query, &user, num_results).await? {
                println!("{:.4}  {}  {}", hit.score, hit.memory.id, hit.memory.text);
            }
        }
        Command::Update { id, text, user } => {
            let record = engine.update(id, &text, &user, None).await?;
            println!("updated {}", record.id);
        }
        Command::Delete { id, user } => {
            engine.delete(id, &user)?;
            println!("deleted {id}");
        }
        Command::DeleteAll { user } => {
            engine.delete_all(&user)?;
            println!("deleted all memories for {user}");
        }
        Command::Reset => {
            engine.reset()?;
            println!("store reset");
        }
        Command::Enhance { id, user } => {
            let record = engine.enhance_memory(id, &user).await?;
            println!("{}", record.text);
        }
        Command::Summarize { user } => {
            let summary = engine.generate_summary(&user).await?;
            println!("{summary}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_defaults_the_category() {
        let cli = Cli::parse_from(["engram", "add", "a note", "--user", "james"]);
        let Command::Add { category, user, .. } = cli.command else {
            panic!("expected add");
        };
        assert_eq!(category, "general");
        assert_eq!(user, "james");
    }

    #[test]
    fn backend_override_parses() {
        let cli = Cli::parse_from([
            "engram", "--backend", "sqlite", "--path", "m.db", "list", "--user", "james",
        ]);
        assert!(matches!(cli.backend, Some(super::BackendArg::Sqlite)));
        assert_eq!(cli.path.as_deref(), Some("m.db"));
    }
}
