//! Workout to-do list

use serde::{Deserialize, Serialize};

use crate::{
    error::TrackerError,
    storage::{Scope, Slot, Storage},
};

pub const TASKS_KEY: &str = "workout_tasks";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistTask {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

impl ChecklistTask {
    fn new(id: u64, text: &str, completed: bool) -> Self {
        Self {
            id,
            text: text.to_string(),
            completed,
        }
    }
}

pub fn default_tasks() -> Vec<ChecklistTask> {
    vec![
        ChecklistTask::new(1, "Morning cardio - 30 min", true),
        ChecklistTask::new(2, "Upper body workout", false),
        ChecklistTask::new(3, "Meal prep for tomorrow", false),
        ChecklistTask::new(4, "Evening yoga session", false),
    ]
}

#[derive(Debug)]
pub struct Checklist {
    tasks: Slot<Vec<ChecklistTask>>,
}

impl Checklist {
    pub fn new(storage: Storage) -> Self {
        Self {
            tasks: Slot::new(storage, TASKS_KEY, Scope::Lifetime, default_tasks()),
        }
    }

    pub fn tasks(&self) -> Vec<ChecklistTask> {
        self.tasks.get()
    }

    pub fn add(&self, text: &str) -> Result<ChecklistTask, TrackerError> {
        let text = non_empty(text)?;
        Ok(self.tasks.update(|tasks| {
            let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let task = ChecklistTask::new(id, text, false);
            tasks.push(task.clone());
            task
        }))
    }

    pub fn edit(&self, id: u64, text: &str) -> Result<ChecklistTask, TrackerError> {
        let text = non_empty(text)?;
        self.with_task(id, |task| task.text = text.to_string())
    }

    pub fn toggle(&self, id: u64) -> Result<ChecklistTask, TrackerError> {
        self.with_task(id, |task| task.completed = !task.completed)
    }

    pub fn delete(&self, id: u64) -> Result<ChecklistTask, TrackerError> {
        self.tasks
            .update(|tasks| {
                let index = tasks.iter().position(|t| t.id == id)?;
                Some(tasks.remove(index))
            })
            .ok_or(TrackerError::NotFound { kind: "task", id })
    }

    pub fn reset(&self) {
        self.tasks.reset();
    }

    fn with_task(
        &self,
        id: u64,
        f: impl FnOnce(&mut ChecklistTask),
    ) -> Result<ChecklistTask, TrackerError> {
        self.tasks
            .update(|tasks| {
                let task = tasks.iter_mut().find(|t| t.id == id)?;
                f(task);
                Some(task.clone())
            })
            .ok_or(TrackerError::NotFound { kind: "task", id })
    }
}

fn non_empty(text: &str) -> Result<&str, TrackerError> {
    let text = text.trim();
    if text.is_empty() {
        Err(TrackerError::Empty("task text"))
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::{
        storage::{FixedClock, MemoryStore},
        tasks::PersistHandle,
    };

    fn checklist() -> (Checklist, Storage) {
        let backend = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
        let writer = PersistHandle::spawn(backend.clone());
        let storage = Storage::new(backend, writer, clock);
        (Checklist::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn starts_with_seeded_tasks() {
        let (list, _) = checklist();
        let tasks = list.tasks();
        assert_eq!(tasks.len(), 4);
        assert!(tasks[0].completed);
    }

    #[tokio::test]
    async fn add_toggle_edit_delete() {
        let (list, _) = checklist();
        let task = list.add("  Leg day  ").unwrap();
        assert_eq!(task.id, 5);
        assert_eq!(task.text, "Leg day");

        assert!(list.toggle(5).unwrap().completed);
        assert_eq!(list.edit(5, "Leg day (heavy)").unwrap().text, "Leg day (heavy)");
        list.delete(5).unwrap();
        assert_eq!(list.tasks().len(), 4);
        assert_eq!(list.toggle(5), Err(TrackerError::NotFound { kind: "task", id: 5 }));
    }

    #[tokio::test]
    async fn changes_survive_a_reload() {
        let (list, storage) = checklist();
        list.delete(1).unwrap();
        storage.flush().await;

        let reloaded = Checklist::new(storage);
        assert_eq!(reloaded.tasks().len(), 3);
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let (list, _) = checklist();
        assert_eq!(list.add(""), Err(TrackerError::Empty("task text")));
        assert_eq!(list.edit(2, " "), Err(TrackerError::Empty("task text")));
    }
}
