//! In-session overdue alerts.
//!
//! # Responsibility
//! - Count overdue tasks after each collection change.
//! - Hand a one-shot alert to the UI side-channel when the policy allows.

use crate::grouping::overdue::count_overdue;
use crate::model::task::Task;
use crate::service::task_board::TaskChangeListener;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// When to raise an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertPolicy {
    /// On every change while at least one task is overdue.
    #[default]
    EveryChange,
    /// Only when the overdue count rises above the last observed count.
    OnIncrease,
}

/// User-facing alert payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverdueAlert {
    pub count: usize,
}

impl OverdueAlert {
    pub const TITLE: &'static str = "Overdue Tasks";

    pub fn message(&self) -> String {
        format!("You have {} task(s) that are overdue!", self.count)
    }
}

/// Receiver of overdue alerts.
pub trait AlertSink: Send {
    fn alert(&mut self, alert: OverdueAlert);
}

impl<F> AlertSink for F
where
    F: FnMut(OverdueAlert) + Send,
{
    fn alert(&mut self, alert: OverdueAlert) {
        self(alert);
    }
}

/// Shared alert queue drained by a polling UI.
#[derive(Debug, Clone, Default)]
pub struct AlertInbox {
    alerts: Arc<Mutex<VecDeque<OverdueAlert>>>,
}

impl AlertInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every queued alert, oldest first.
    pub fn drain(&self) -> Vec<OverdueAlert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AlertSink for AlertInbox {
    fn alert(&mut self, alert: OverdueAlert) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(alert);
    }
}

/// Change listener that raises overdue alerts.
pub struct OverdueNotifier<K: AlertSink> {
    sink: K,
    policy: AlertPolicy,
    last_count: usize,
}

impl<K: AlertSink> OverdueNotifier<K> {
    pub fn new(sink: K, policy: AlertPolicy) -> Self {
        Self {
            sink,
            policy,
            last_count: 0,
        }
    }

    /// Evaluates `tasks` at `now` and alerts when the policy allows.
    ///
    /// Returns the alert that was raised, if any.
    pub fn evaluate(&mut self, tasks: &[Task], now: DateTime<Utc>) -> Option<OverdueAlert> {
        let count = count_overdue(tasks, now);
        let previous = std::mem::replace(&mut self.last_count, count);
        let should_alert = match self.policy {
            AlertPolicy::EveryChange => count > 0,
            AlertPolicy::OnIncrease => count > previous,
        };
        if !should_alert {
            return None;
        }

        debug!("event=overdue_alert module=service status=ok count={count}");
        let alert = OverdueAlert { count };
        self.sink.alert(alert);
        Some(alert)
    }
}

impl<K: AlertSink> TaskChangeListener for OverdueNotifier<K> {
    fn on_tasks_changed(&mut self, tasks: &[Task], now: DateTime<Utc>) {
        self.evaluate(tasks, now);
    }
}
