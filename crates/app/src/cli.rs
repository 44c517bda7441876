//! Command line front desk
//!
//! Reads go straight to the façades; mutating commands save the store back
//! to the snapshot file afterwards.

mod format;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use grandview_core::{
    GuestAssignment, NewTask, RecordId, Result, ResultExt, RoomStatus, TaskPatch, TaskPriority,
    TaskStatus,
};

use crate::state::AppState;

use format::{format_bulk, format_room, format_rooms, format_staff, format_stats, format_tasks};

/// Grandview front desk: room board and housekeeping.
#[derive(Debug, Parser)]
#[command(name = "grandview", version)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the room board
    Rooms,

    /// List housekeeping tasks, newest first
    Tasks {
        #[arg(long, value_parser = parse_task_status)]
        status: Option<TaskStatus>,
    },

    /// List housekeeping staff
    Staff,

    /// Housekeeping summary
    Stats,

    /// Set a room's status
    RoomStatus {
        id: RecordId,
        #[arg(value_parser = parse_room_status)]
        status: RoomStatus,
    },

    /// Check a guest into a room
    AssignGuest {
        id: RecordId,
        name: String,
        /// Expected checkout, RFC 3339
        #[arg(long)]
        checkout: Option<DateTime<Utc>>,
    },

    /// Check the guest out and send the room to cleaning
    Checkout { id: RecordId },

    /// Take a room out of order
    Block { id: RecordId, reason: String },

    /// Return a blocked room to service
    Unblock { id: RecordId },

    /// Set the status of several rooms at once
    BulkStatus {
        #[arg(value_parser = parse_room_status)]
        status: RoomStatus,
        #[arg(required = true)]
        ids: Vec<RecordId>,
    },

    /// Block several rooms at once
    BulkBlock {
        #[arg(long)]
        reason: String,
        #[arg(required = true)]
        ids: Vec<RecordId>,
    },

    /// Add a note to a room
    Note { id: RecordId, text: String },

    /// Create a housekeeping task
    NewTask {
        room_number: String,
        room_id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_task_priority)]
        priority: Option<TaskPriority>,
        /// Estimated minutes
        #[arg(long)]
        estimate: Option<i64>,
        #[arg(long = "type")]
        task_type: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
        /// Comma-separated supply list
        #[arg(long, value_delimiter = ',')]
        supplies: Vec<String>,
    },

    /// Move a task to a new status
    TaskStatus {
        id: RecordId,
        #[arg(value_parser = parse_task_status)]
        status: TaskStatus,
        #[arg(long)]
        actual_minutes: Option<i64>,
    },

    /// Assign a task to a staff member
    AssignTask { task: RecordId, staff: RecordId },

    /// Delete a task
    DeleteTask { id: RecordId },
}

impl Command {
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Command::Rooms | Command::Tasks { .. } | Command::Staff | Command::Stats
        )
    }
}

fn parse_room_status(s: &str) -> std::result::Result<RoomStatus, String> {
    RoomStatus::parse(s).ok_or_else(|| {
        let known: Vec<&str> = RoomStatus::all().iter().map(|s| s.as_str()).collect();
        format!("unknown room status '{}' (expected one of: {})", s, known.join(", "))
    })
}

fn parse_task_status(s: &str) -> std::result::Result<TaskStatus, String> {
    TaskStatus::parse(s).ok_or_else(|| {
        let known: Vec<&str> = TaskStatus::all().iter().map(|s| s.as_str()).collect();
        format!("unknown task status '{}' (expected one of: {})", s, known.join(", "))
    })
}

fn parse_task_priority(s: &str) -> std::result::Result<TaskPriority, String> {
    TaskPriority::parse(s).ok_or_else(|| format!("unknown priority '{}'", s))
}

/// Run one command against the store and print its output
pub async fn run(state: &AppState, command: Command) -> Result<()> {
    let mutating = command.is_mutating();

    match command {
        Command::Rooms => {
            // An unreachable store still prints an (empty) board
            let rooms = state.rooms.get_all().await.or_empty();
            println!("{}", format_rooms(&rooms));
        }
        Command::Tasks { status } => {
            let tasks = match status {
                Some(status) => state.housekeeping.get_tasks_by_status(status).await?,
                None => state.housekeeping.get_all_tasks().await?,
            };
            println!("{}", format_tasks(&tasks));
        }
        Command::Staff => {
            let staff = state.housekeeping.get_all_staff().await?;
            println!("{}", format_staff(&staff));
        }
        Command::Stats => {
            let stats = state.housekeeping.compute_stats().await?;
            println!("{}", format_stats(&stats));
        }
        Command::RoomStatus { id, status } => {
            let room = state.rooms.set_status(id, status).await?;
            println!("{}", format_room(&room));
        }
        Command::AssignGuest { id, name, checkout } => {
            let guest = GuestAssignment {
                checkout_time: checkout,
                ..GuestAssignment::new(name)
            };
            let room = state.rooms.assign_guest(id, &guest).await?;
            println!("{}", format_room(&room));
        }
        Command::Checkout { id } => {
            let room = state.rooms.checkout_guest(id).await?;
            println!("{}", format_room(&room));
        }
        Command::Block { id, reason } => {
            let room = state.rooms.block_room(id, &reason).await?;
            println!("{}", format_room(&room));
        }
        Command::Unblock { id } => {
            let room = state.rooms.unblock_room(id).await?;
            println!("{}", format_room(&room));
        }
        Command::BulkStatus { status, ids } => {
            let outcome = state.rooms.bulk_set_status(&ids, status).await?;
            println!("{}", format_bulk(&outcome));
        }
        Command::BulkBlock { reason, ids } => {
            let outcome = state.rooms.bulk_block(&ids, &reason).await?;
            println!("{}", format_bulk(&outcome));
        }
        Command::Note { id, text } => {
            let room = state.rooms.add_note(id, &text).await?;
            println!("{}", format_room(&room));
        }
        Command::NewTask {
            room_number,
            room_id,
            name,
            priority,
            estimate,
            task_type,
            instructions,
            supplies,
        } => {
            let task = NewTask {
                name,
                priority,
                estimated_time: estimate,
                task_type,
                special_instructions: instructions,
                supplies,
                ..NewTask::new(room_number, room_id)
            };
            let created = state.housekeeping.create_task(&task).await?;
            println!("{}", format_tasks(std::slice::from_ref(&created)));
        }
        Command::TaskStatus {
            id,
            status,
            actual_minutes,
        } => {
            let extra = match actual_minutes {
                Some(minutes) => TaskPatch::new().actual_time(minutes),
                None => TaskPatch::new(),
            };
            let task = state.housekeeping.set_task_status(id, status, extra).await?;
            println!("{}", format_tasks(std::slice::from_ref(&task)));
        }
        Command::AssignTask { task, staff } => {
            let task = state.housekeeping.assign_task(task, staff).await?;
            println!("{}", format_tasks(std::slice::from_ref(&task)));
        }
        Command::DeleteTask { id } => {
            state.housekeeping.delete_task(id).await?;
            println!("Deleted task {}", id);
        }
    }

    if mutating {
        state.persist().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use grandview_core::{Collection, InMemoryGateway, RecordingNotifier, StoreSnapshot};
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> (AppState, Arc<InMemoryGateway>) {
        let mut snapshot = StoreSnapshot::new();
        snapshot.insert(
            Collection::Rooms,
            vec![json!({"Id": 1, "room_number_c": "101", "status_c": "Occupied",
                        "guest_name_c": "Ada"})
            .as_object()
            .cloned()
            .unwrap()],
        );
        let store = Arc::new(InMemoryGateway::from_snapshot(snapshot));
        let state = AppState::with_store(
            store.clone(),
            Arc::new(RecordingNotifier::new()),
            &Config::default(),
            None,
        );
        (state, store)
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["grandview", "bulk-status", "out of order", "1", "2"]);
        match cli.command {
            Command::BulkStatus { status, ids } => {
                assert_eq!(status, RoomStatus::OutOfOrder);
                assert_eq!(ids, vec![RecordId(1), RecordId(2)]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::parse_from(["grandview", "tasks", "--status", "in_progress"]);
        assert!(matches!(
            cli.command,
            Command::Tasks {
                status: Some(TaskStatus::InProgress)
            }
        ));
        assert!(!cli.command.is_mutating());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = Cli::try_parse_from(["grandview", "room-status", "1", "Vacant"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_checkout_command() {
        let (state, store) = state();
        run(&state, Command::Checkout { id: RecordId(1) })
            .await
            .unwrap();

        let raw = store.record(Collection::Rooms, RecordId(1)).await.unwrap();
        assert_eq!(raw["status_c"], "Cleaning");
        assert_eq!(raw["guest_name_c"], "Ada");
    }

    #[tokio::test]
    async fn test_rooms_survives_offline_store() {
        let (state, store) = state();
        store.set_offline(true).await;
        run(&state, Command::Rooms).await.unwrap();
    }
}
