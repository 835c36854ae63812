use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;

use super::models::{TaskHistoryEntry, TaskResult, TaskStatus};

/// Bounded ring of finished tasks, oldest dropped first.
pub struct TaskHistory {
    entries: Mutex<VecDeque<TaskHistoryEntry>>,
    limit: usize,
}

impl TaskHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            limit: limit.max(1),
        }
    }

    pub fn record(&self, result: &TaskResult) {
        let entry = TaskHistoryEntry {
            task_id: result.task_id.clone(),
            task_type: result.task_type.clone(),
            status: if result.success {
                TaskStatus::Completed
            } else {
                TaskStatus::Failed
            },
            timestamp: Utc::now(),
            error: result.error.as_ref().map(|e| e.message.clone()),
        };
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == self.limit {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<TaskHistoryEntry> {
        self.entries
            .lock()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }
}
