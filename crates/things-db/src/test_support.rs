//! In-memory repository for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use things_model::{RepeatTarget, RepeatUpdate, Task, TaskKind, TaskMatch, TaskStatus};

use crate::error::{StoreError, StoreResult};
use crate::filter::QueryPlan;
use crate::repository::{ReferenceKind, TaskRepository};

#[derive(Default)]
pub struct FakeRepo {
    pub tasks: Vec<Task>,
    /// (kind, uuid, title)
    pub references: Vec<(ReferenceKind, String, String)>,
    pub targets: Vec<RepeatTarget>,
    /// Successive answers to `tasks_by_title_since`; the last one repeats.
    pub title_matches: RefCell<VecDeque<Vec<TaskMatch>>>,
    pub title_lookups: RefCell<usize>,
    pub plans: RefCell<Vec<QueryPlan>>,
    /// Answers to successive `tasks` calls; once drained, `tasks` is paged.
    pub batches: RefCell<VecDeque<Vec<Task>>>,
    pub applied: RefCell<Vec<(String, RepeatUpdate)>>,
    pub cleared: RefCell<Vec<String>>,
}

impl FakeRepo {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn reference(mut self, kind: ReferenceKind, uuid: &str, title: &str) -> Self {
        self.references
            .push((kind, uuid.to_string(), title.to_string()));
        self
    }

    pub fn target(mut self, target: RepeatTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn last_plan(&self) -> QueryPlan {
        self.plans.borrow().last().cloned().unwrap()
    }
}

/// An incomplete, untrashed to-do target.
pub fn todo_target(uuid: &str) -> RepeatTarget {
    RepeatTarget {
        uuid: uuid.to_string(),
        title: format!("Task {uuid}"),
        kind: Some(TaskKind::Todo),
        status: Some(TaskStatus::Incomplete),
        trashed: false,
        repeating: false,
        repeating_template_id: None,
    }
}

impl TaskRepository for FakeRepo {
    fn tasks(&self, plan: &QueryPlan) -> StoreResult<Vec<Task>> {
        self.plans.borrow_mut().push(plan.clone());
        if let Some(batch) = self.batches.borrow_mut().pop_front() {
            return Ok(batch);
        }
        let offset = plan.offset.unwrap_or(0);
        let limit = plan.limit.filter(|l| *l > 0).unwrap_or(usize::MAX);
        Ok(self.tasks.iter().skip(offset).take(limit).cloned().collect())
    }

    fn resolve_reference(&self, kind: ReferenceKind, input: &str) -> StoreResult<String> {
        self.references
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .find(|(_, uuid, title)| uuid == input || title.to_lowercase() == input.to_lowercase())
            .map(|(_, uuid, _)| uuid.clone())
            .ok_or_else(|| StoreError::not_found(kind, input))
    }

    fn tasks_by_title_since(
        &self,
        title: &str,
        _kind: TaskKind,
        _since: f64,
    ) -> StoreResult<Vec<TaskMatch>> {
        if title.is_empty() {
            return Err(StoreError::TitleRequired);
        }
        *self.title_lookups.borrow_mut() += 1;
        let mut queue = self.title_matches.borrow_mut();
        if queue.len() > 1 {
            return Ok(queue.pop_front().unwrap_or_default());
        }
        Ok(queue.front().cloned().unwrap_or_default())
    }

    fn repeat_target(&self, id: &str) -> StoreResult<RepeatTarget> {
        self.targets
            .iter()
            .find(|t| t.uuid == id)
            .cloned()
            .ok_or_else(|| StoreError::TaskNotFound { id: id.to_string() })
    }

    fn apply_repeat_rule(&self, id: &str, update: &RepeatUpdate) -> StoreResult<()> {
        self.applied
            .borrow_mut()
            .push((id.to_string(), update.clone()));
        Ok(())
    }

    fn clear_repeat_rule(&self, id: &str) -> StoreResult<()> {
        self.cleared.borrow_mut().push(id.to_string());
        Ok(())
    }
}
