//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `todum_core` linkage and the store/group round-trip without any UI.
//! - Keep output deterministic apart from the local-time section labels.

use chrono::{TimeDelta, Utc};
use std::process::ExitCode;
use todum_core::{SqliteSlotStore, TaskBoard, TaskDraft, TaskRepository};

fn main() -> ExitCode {
    println!("todum_core ping={}", todum_core::ping());
    println!("todum_core version={}", todum_core::core_version());

    let store = match SqliteSlotStore::open_in_memory() {
        Ok(store) => store,
        Err(err) => {
            eprintln!("todum_core store=error {err}");
            return ExitCode::FAILURE;
        }
    };
    let repository = TaskRepository::new(store);

    let now = Utc::now();
    let mut board = TaskBoard::new(repository.load());
    let drafts = [
        TaskDraft::new("smoke overdue", "", now - TimeDelta::hours(2)),
        TaskDraft::new("smoke upcoming", "", now + TimeDelta::days(3)),
    ];
    for draft in drafts {
        if let Err(err) = board.add(draft) {
            eprintln!("todum_core add=error {err}");
            return ExitCode::FAILURE;
        }
    }
    if !repository.save(board.tasks()) {
        eprintln!("todum_core save=error");
        return ExitCode::FAILURE;
    }

    let reloaded = TaskBoard::new(repository.load());
    println!("todum_core roundtrip={}", reloaded.tasks() == board.tasks());
    println!("todum_core overdue={}", reloaded.overdue_count());
    for group in &reloaded.grouped() {
        println!("todum_core group=\"{}\" count={}", group.label, group.tasks.len());
    }
    ExitCode::SUCCESS
}
