//! Ordered background persistence.
//!
//! # Responsibility
//! - Take whole-collection snapshots off the mutation path.
//! - Write them to the slot in issue order on one writer thread.
//!
//! # Invariants
//! - A single thread owns the repository, so writes never overlap.
//! - When snapshots queue up, only the newest is written; an older snapshot
//!   is never written after a newer one.
//! - `flush` returns only after every snapshot enqueued before it is handled.
//! - Dropping `SaveQueue` drains pending snapshots before the thread exits.

use crate::model::task::Task;
use crate::repo::task_repo::TaskRepository;
use crate::service::task_board::TaskChangeListener;
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

enum SaveCommand {
    Save(Vec<Task>),
    Flush(Sender<()>),
    Shutdown,
}

/// Owner of the writer thread.
pub struct SaveQueue {
    sender: Sender<SaveCommand>,
    worker: Option<JoinHandle<()>>,
}

/// Cloneable producer side of a `SaveQueue`.
///
/// Handles stay valid after the queue is dropped; later snapshots are
/// discarded with a warning.
#[derive(Clone)]
pub struct SaveHandle {
    sender: Sender<SaveCommand>,
}

impl SaveQueue {
    /// Starts the writer thread, moving `repository` onto it.
    pub fn spawn<S>(repository: TaskRepository<S>) -> std::io::Result<Self>
    where
        S: KeyValueStore + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("todum-save-queue".to_string())
            .spawn(move || run_writer(repository, receiver))?;
        info!("event=save_queue_start module=service status=ok");
        Ok(Self {
            sender,
            worker: Some(worker),
        })
    }

    /// Returns a producer handle, e.g. to register as a board listener.
    pub fn handle(&self) -> SaveHandle {
        SaveHandle {
            sender: self.sender.clone(),
        }
    }

    /// Enqueues a snapshot without waiting for the write.
    pub fn enqueue(&self, tasks: Vec<Task>) {
        enqueue_on(&self.sender, tasks);
    }

    /// Blocks until all previously enqueued snapshots are handled.
    pub fn flush(&self) -> bool {
        flush_on(&self.sender)
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        let _ = self.sender.send(SaveCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=save_queue_stop module=service status=error error_code=worker_panicked");
            }
        }
    }
}

impl SaveHandle {
    pub fn enqueue(&self, tasks: Vec<Task>) {
        enqueue_on(&self.sender, tasks);
    }

    pub fn flush(&self) -> bool {
        flush_on(&self.sender)
    }
}

impl TaskChangeListener for SaveHandle {
    fn on_tasks_changed(&mut self, tasks: &[Task], _now: DateTime<Utc>) {
        self.enqueue(tasks.to_vec());
    }
}

fn enqueue_on(sender: &Sender<SaveCommand>, tasks: Vec<Task>) {
    let count = tasks.len();
    if sender.send(SaveCommand::Save(tasks)).is_err() {
        warn!(
            "event=tasks_save module=service status=dropped reason=queue_closed count={count}"
        );
    }
}

fn flush_on(sender: &Sender<SaveCommand>) -> bool {
    let (ack_sender, ack_receiver) = mpsc::channel();
    if sender.send(SaveCommand::Flush(ack_sender)).is_err() {
        return false;
    }
    ack_receiver.recv().is_ok()
}

fn run_writer<S: KeyValueStore>(repository: TaskRepository<S>, receiver: Receiver<SaveCommand>) {
    let mut running = true;
    while running {
        let Ok(first) = receiver.recv() else {
            break;
        };

        let mut latest: Option<Vec<Task>> = None;
        let mut acks: Vec<Sender<()>> = Vec::new();
        let mut coalesced = 0usize;
        let mut pending = Some(first);
        while let Some(command) = pending.take() {
            match command {
                SaveCommand::Save(tasks) => {
                    if latest.replace(tasks).is_some() {
                        coalesced += 1;
                    }
                }
                SaveCommand::Flush(ack) => acks.push(ack),
                SaveCommand::Shutdown => running = false,
            }
            pending = receiver.try_recv().ok();
        }

        if let Some(tasks) = latest {
            if coalesced > 0 {
                info!("event=tasks_save module=service status=coalesced skipped={coalesced}");
            }
            repository.save(&tasks);
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
    info!("event=save_queue_stop module=service status=ok");
}
