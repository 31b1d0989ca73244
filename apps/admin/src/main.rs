use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{push::spawn_push_events, Credentials, HttpApiClient};
use controller::{
    reducer::settings::{resource_limits, task_limits},
    Action, Store, StoreHandle, WorkflowExecutor,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(about = "Administration client for the analysis platform")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    log_filter: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    ListUsers,
    CreateUser {
        user_id: String,
        password: String,
        #[arg(long)]
        force_reset: bool,
    },
    SetPassword {
        user_id: String,
        password: String,
        confirm: String,
    },
    SetForceReset {
        user_id: String,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    SetPrimaryGroup {
        user_id: String,
        group_id: String,
    },
    AddToGroup {
        user_id: String,
        group_id: String,
    },
    RemoveFromGroup {
        user_id: String,
        group_id: String,
    },
    FindHmms {
        #[arg(long, default_value = "")]
        find: String,
        #[arg(long)]
        page: Option<u32>,
    },
    GetHmm {
        hmm_id: String,
    },
    InstallHmms,
    FindAnalyses {
        sample_id: String,
        #[arg(long, default_value = "")]
        find: String,
        #[arg(long)]
        page: Option<u32>,
    },
    GetAnalysis {
        analysis_id: String,
    },
    Blast {
        analysis_id: String,
        sequence_index: u32,
    },
    ListIndexes,
    FindReferences {
        #[arg(long, default_value = "")]
        find: String,
        #[arg(long)]
        page: Option<u32>,
    },
    GetReference {
        ref_id: String,
    },
    CheckUpdates {
        ref_id: String,
    },
    UpdateReference {
        ref_id: String,
    },
    FindSubtractions {
        #[arg(long, default_value = "")]
        find: String,
        #[arg(long)]
        page: Option<u32>,
    },
    GetSubtraction {
        subtraction_id: String,
    },
    GetSettings,
    /// Per-task resource limits derived from the server settings.
    TaskLimits,
    /// `value` is parsed as JSON and sent as a string when it is not JSON.
    UpdateSetting {
        key: String,
        value: String,
    },
    FindFiles {
        file_type: String,
        #[arg(long, default_value = "")]
        find: String,
        #[arg(long)]
        page: Option<u32>,
    },
    RemoveFile {
        file_id: String,
    },
    /// Apply server push events to the local state until interrupted.
    Watch,
}

impl Command {
    /// The action to dispatch and the state slice to print afterwards.
    fn request(self) -> Option<(Action, &'static str)> {
        let request = match self {
            Command::ListUsers => (Action::ListUsersRequested, "users"),
            Command::CreateUser {
                user_id,
                password,
                force_reset,
            } => (
                Action::CreateUserRequested {
                    user_id,
                    password,
                    force_reset,
                },
                "users",
            ),
            Command::SetPassword {
                user_id,
                password,
                confirm,
            } => (
                Action::SetPasswordRequested {
                    user_id,
                    password,
                    confirm,
                },
                "users",
            ),
            Command::SetForceReset { user_id, enabled } => (
                Action::SetForceResetRequested { user_id, enabled },
                "users",
            ),
            Command::SetPrimaryGroup { user_id, group_id } => (
                Action::SetPrimaryGroupRequested {
                    user_id,
                    primary_group: group_id,
                },
                "users",
            ),
            Command::AddToGroup { user_id, group_id } => (
                Action::AddUserToGroupRequested { user_id, group_id },
                "users",
            ),
            Command::RemoveFromGroup { user_id, group_id } => (
                Action::RemoveUserFromGroupRequested { user_id, group_id },
                "users",
            ),
            Command::FindHmms { find, page } => {
                (Action::FindHmmsRequested { term: find, page }, "hmm")
            }
            Command::GetHmm { hmm_id } => (Action::GetHmmRequested { hmm_id }, "hmm"),
            Command::InstallHmms => (Action::InstallHmmsRequested, "hmm"),
            Command::FindAnalyses {
                sample_id,
                find,
                page,
            } => (
                Action::FindAnalysesRequested {
                    sample_id,
                    term: find,
                    page,
                },
                "analyses",
            ),
            Command::GetAnalysis { analysis_id } => {
                (Action::GetAnalysisRequested { analysis_id }, "analyses")
            }
            Command::Blast {
                analysis_id,
                sequence_index,
            } => (
                Action::BlastNuvsRequested {
                    analysis_id,
                    sequence_index,
                },
                "analyses",
            ),
            Command::ListIndexes => (Action::ListReadyIndexesRequested, "analyses"),
            Command::FindReferences { find, page } => (
                Action::FindReferencesRequested { term: find, page },
                "references",
            ),
            Command::GetReference { ref_id } => {
                (Action::GetReferenceRequested { ref_id }, "references")
            }
            Command::CheckUpdates { ref_id } => {
                (Action::CheckRemoteUpdatesRequested { ref_id }, "references")
            }
            Command::UpdateReference { ref_id } => (
                Action::UpdateRemoteReferenceRequested { ref_id },
                "references",
            ),
            Command::FindSubtractions { find, page } => (
                Action::FindSubtractionsRequested { term: find, page },
                "subtraction",
            ),
            Command::GetSubtraction { subtraction_id } => (
                Action::GetSubtractionRequested { subtraction_id },
                "subtraction",
            ),
            Command::GetSettings | Command::TaskLimits => {
                (Action::GetSettingsRequested, "settings")
            }
            Command::UpdateSetting { key, value } => {
                let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
                (Action::UpdateSettingRequested { key, value }, "settings")
            }
            Command::FindFiles {
                file_type,
                find,
                page,
            } => (
                Action::FindFilesRequested {
                    file_type,
                    term: find,
                    page,
                },
                "files",
            ),
            Command::RemoveFile { file_id } => (Action::RemoveFileRequested { file_id }, "files"),
            Command::Watch => return None,
        };
        Some(request)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(log_filter) = cli.log_filter {
        settings.log_filter = log_filter;
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter '{}': {err}", settings.log_filter);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let credentials = match (settings.api_user.clone(), settings.api_key.clone()) {
        (Some(user_id), Some(api_key)) => Some(Credentials { user_id, api_key }),
        _ => None,
    };
    let api = HttpApiClient::with_credentials(&settings.server_url, credentials)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let (store, _store_task) = Store::spawn(WorkflowExecutor::with_default_workflows(Arc::new(api)));
    info!(server_url = %settings.server_url, "admin: store started");

    let task_limits_only = matches!(cli.command, Command::TaskLimits);
    let Some((action, slice)) = cli.command.request() else {
        if !settings.push_enabled {
            bail!("push events are disabled (push_enabled = false)");
        }
        return watch(&store, &settings.server_url).await;
    };

    let kind = action.kind();
    let (terminal, snapshot) = store
        .dispatch_and_wait(action)
        .await
        .with_context(|| format!("{kind} was not completed"))?;
    if let Some(failure) = terminal.failure() {
        match failure.status {
            Some(status) => bail!("{}: {} ({status})", terminal.kind(), failure.message),
            None => bail!("{}: {}", terminal.kind(), failure.message),
        }
    }

    let output = if task_limits_only {
        let data = snapshot.settings.data.clone().unwrap_or_default();
        let mut tasks = serde_json::Map::new();
        for (task, limits) in task_limits(&data) {
            tasks.insert(task.to_string(), serde_json::to_value(limits)?);
        }
        let (proc, mem) = resource_limits(&data);
        json!({ "proc": proc, "mem": mem, "tasks": tasks })
    } else {
        serde_json::to_value(&*snapshot)?
            .get(slice)
            .cloned()
            .unwrap_or(Value::Null)
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn watch(store: &StoreHandle, server_url: &str) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let listener = spawn_push_events(server_url, tx).await?;

    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else {
                    warn!("admin: push listener closed");
                    break;
                };
                let Some(action) = Action::from_push(message) else {
                    continue;
                };
                println!("{}", serde_json::to_string(&action)?);
                store.dispatch(action)?;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                info!("admin: interrupted");
                break;
            }
        }
    }

    listener.abort();
    Ok(())
}
