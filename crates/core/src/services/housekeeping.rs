//! Housekeeping task and staff façade

use std::sync::Arc;

use chrono::{Local, Utc};
use tracing::{debug, instrument, warn};

use super::{report, single_result, FacadeOptions};
use crate::error::{Error, Result};
use crate::gateway::{
    ensure_success, Collection, FetchQuery, FieldSelector, RecordGateway, SortDirection,
};
use crate::invariants::assert_task_patch_invariants;
use crate::mapper::{decode_all, staff_fields, task_fields, FromRecord};
use crate::models::{HousekeepingTask, NewTask, RecordId, Staff, TaskStatus};
use crate::notify::{Notice, Notifier};
use crate::stats::{compute_stats, HousekeepingStats};
use crate::transitions::{task_status_patch, TaskPatch, TransitionPolicy};

/// Staff name written when the staff lookup fails
const UNKNOWN_STAFF: &str = "Unknown";

pub struct HousekeepingService {
    gateway: Arc<dyn RecordGateway>,
    notifier: Arc<dyn Notifier>,
    options: FacadeOptions,
}

impl HousekeepingService {
    pub fn new(gateway: Arc<dyn RecordGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            options: FacadeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FacadeOptions) -> Self {
        self.options = options;
        self
    }

    /// All tasks, newest first
    #[instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<HousekeepingTask>> {
        let query = FetchQuery::select(task_fields::ALL)
            .order_by(task_fields::CREATED_AT, SortDirection::Descending);
        let result = self.fetch_tasks(&query).await;
        report(self.notifier.as_ref(), "Failed to load tasks", result)
    }

    #[instrument(skip(self))]
    pub async fn get_tasks_by_status(&self, status: TaskStatus) -> Result<Vec<HousekeepingTask>> {
        let query =
            FetchQuery::select(task_fields::ALL).where_eq(task_fields::STATUS, status.as_str());
        let result = self.fetch_tasks(&query).await;
        report(self.notifier.as_ref(), "Failed to load tasks", result)
    }

    #[instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: RecordId) -> Result<HousekeepingTask> {
        let result = self.fetch_task(id).await;
        report(self.notifier.as_ref(), "Failed to load task", result)
    }

    #[instrument(skip(self, task), fields(room = %task.room_number))]
    pub async fn create_task(&self, task: &NewTask) -> Result<HousekeepingTask> {
        let result: Result<HousekeepingTask> = async {
            let record = task.to_record(&self.options.operator, Utc::now());
            let resp = self
                .gateway
                .create_records(Collection::HousekeepingTasks, vec![record])
                .await?;
            single_result(resp)
        }
        .await;

        let created = report(self.notifier.as_ref(), "Failed to create task", result)?;
        self.notifier
            .notify(Notice::success("Task created successfully"));
        Ok(created)
    }

    /// Move a task to `status`. Entering `in_progress` stamps the start time,
    /// entering `completed` stamps the completion time; earlier stamps stay.
    #[instrument(skip(self, extra))]
    pub async fn set_task_status(
        &self,
        id: RecordId,
        status: TaskStatus,
        extra: TaskPatch,
    ) -> Result<HousekeepingTask> {
        let result: Result<HousekeepingTask> = async {
            if self.options.policy != TransitionPolicy::Unrestricted {
                let current = self.fetch_task(id).await?;
                self.options.policy.check_task(current.status, status)?;
            }

            let patch = task_status_patch(status, extra, Utc::now());
            self.write(id, patch).await
        }
        .await;

        let task = report(self.notifier.as_ref(), "Failed to update task status", result)?;
        self.notifier
            .notify(Notice::success(format!("Task {}", status.label())));
        Ok(task)
    }

    /// Assign a task to a staff member, copying the member's display name
    #[instrument(skip(self))]
    pub async fn assign_task(
        &self,
        task_id: RecordId,
        staff_id: RecordId,
    ) -> Result<HousekeepingTask> {
        let staff_name = self.staff_name(staff_id).await;

        let result = self
            .write(task_id, TaskPatch::new().assigned_to(staff_id, &staff_name))
            .await;

        let task = report(self.notifier.as_ref(), "Failed to assign task", result)?;
        self.notifier
            .notify(Notice::success(format!("Task assigned to {}", staff_name)));
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn delete_task(&self, id: RecordId) -> Result<()> {
        let result: Result<()> = async {
            let resp = self
                .gateway
                .delete_records(Collection::HousekeepingTasks, &[id])
                .await?;
            ensure_success(resp.success, resp.message.as_deref())
        }
        .await;

        report(self.notifier.as_ref(), "Failed to delete task", result)?;
        self.notifier
            .notify(Notice::success("Task deleted successfully"));
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_all_staff(&self) -> Result<Vec<Staff>> {
        let result = self.fetch_staff().await;
        report(self.notifier.as_ref(), "Failed to load staff", result)
    }

    /// Summary figures from a full fetch of tasks and staff
    #[instrument(skip(self))]
    pub async fn compute_stats(&self) -> Result<HousekeepingStats> {
        let result: Result<HousekeepingStats> = async {
            let query = FetchQuery::select(task_fields::ALL);
            let tasks = self.fetch_tasks(&query).await?;
            let staff = self.fetch_staff().await?;
            Ok(compute_stats(&tasks, staff, &Local::now()))
        }
        .await;
        report(self.notifier.as_ref(), "Failed to load housekeeping stats", result)
    }

    async fn fetch_tasks(&self, query: &FetchQuery) -> Result<Vec<HousekeepingTask>> {
        let resp = self
            .gateway
            .fetch_records(Collection::HousekeepingTasks, query)
            .await?;
        ensure_success(resp.success, resp.message.as_deref())?;

        debug!(count = resp.data.len(), "Fetched tasks");
        Ok(decode_all(&resp.data))
    }

    async fn fetch_task(&self, id: RecordId) -> Result<HousekeepingTask> {
        let not_found = || Error::NotFound(format!("Task with ID {} not found", id));

        let resp = match self
            .gateway
            .get_record_by_id(
                Collection::HousekeepingTasks,
                id,
                &FieldSelector::list(task_fields::ALL),
            )
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%id, error = %e, "Task lookup failed");
                return Err(not_found());
            }
        };

        match resp.data {
            Some(raw) if resp.success => HousekeepingTask::from_record(&raw),
            _ => {
                warn!(%id, message = ?resp.message, "Task lookup returned nothing");
                Err(not_found())
            }
        }
    }

    async fn fetch_staff(&self) -> Result<Vec<Staff>> {
        let query = FetchQuery::select(staff_fields::ALL);
        let resp = self.gateway.fetch_records(Collection::Staff, &query).await?;
        ensure_success(resp.success, resp.message.as_deref())?;

        debug!(count = resp.data.len(), "Fetched staff");
        Ok(decode_all(&resp.data))
    }

    /// Best-effort lookup; a failed lookup does not block the assignment
    async fn staff_name(&self, staff_id: RecordId) -> String {
        let fields = FieldSelector::list(&[staff_fields::NAME]);
        match self
            .gateway
            .get_record_by_id(Collection::Staff, staff_id, &fields)
            .await
        {
            Ok(resp) if resp.success => resp
                .data
                .as_ref()
                .and_then(|raw| raw.get(staff_fields::NAME))
                .and_then(|name| name.as_str())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| UNKNOWN_STAFF.to_string()),
            Ok(resp) => {
                warn!(%staff_id, message = ?resp.message, "Staff lookup refused");
                UNKNOWN_STAFF.to_string()
            }
            Err(e) => {
                warn!(%staff_id, error = %e, "Staff lookup failed");
                UNKNOWN_STAFF.to_string()
            }
        }
    }

    async fn write(&self, id: RecordId, patch: TaskPatch) -> Result<HousekeepingTask> {
        assert_task_patch_invariants(&patch);
        let resp = self
            .gateway
            .update_records(Collection::HousekeepingTasks, vec![patch.into_record(id)])
            .await?;
        single_result(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{InMemoryGateway, RawRecord, StoreSnapshot};
    use crate::models::TaskPriority;
    use crate::notify::RecordingNotifier;
    use crate::services::DEFAULT_OPERATOR;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn store() -> Arc<InMemoryGateway> {
        let mut snapshot = StoreSnapshot::new();
        snapshot.insert(
            Collection::HousekeepingTasks,
            vec![
                raw(json!({
                    "Id": 1, "room_number_c": "101", "room_id_c": {"Id": 1, "Name": "101"},
                    "status_c": "pending", "priority_c": "high",
                    "created_at_c": "2024-07-01T08:00:00.000Z", "supplies_c": "towels,soap"
                })),
                raw(json!({
                    "Id": 2, "room_number_c": "102", "room_id_c": 2,
                    "status_c": "completed", "actual_time_c": 20,
                    "completed_time_c": "2024-07-01T10:00:00.000Z",
                    "created_at_c": "2024-07-01T09:00:00.000Z"
                })),
                raw(json!({
                    "Id": 3, "room_number_c": "103", "status_c": "in_progress",
                    "actual_time_c": 10, "created_at_c": "2024-07-01T07:00:00.000Z"
                })),
            ],
        );
        snapshot.insert(
            Collection::Staff,
            vec![raw(json!({
                "Id": 5, "name_c": "Maria Lopez", "role_c": "Housekeeper",
                "active_assignments_c": 2, "specialties_c": "deep_clean"
            }))],
        );
        Arc::new(InMemoryGateway::from_snapshot(snapshot))
    }

    fn service(store: &Arc<InMemoryGateway>) -> (HousekeepingService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let service = HousekeepingService::new(store.clone(), notifier.clone());
        (service, notifier)
    }

    #[tokio::test]
    async fn test_get_all_tasks_newest_first() {
        let store = store();
        let (housekeeping, _) = service(&store);

        let tasks = housekeeping.get_all_tasks().await.unwrap();
        let ids: Vec<RecordId> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![RecordId(2), RecordId(1), RecordId(3)]);
        assert_eq!(tasks[1].room_id, Some(RecordId(1)));
        assert_eq!(tasks[1].supplies, vec!["towels", "soap"]);
        assert_eq!(tasks[1].priority, TaskPriority::High);
    }

    #[tokio::test]
    async fn test_get_tasks_by_status() {
        let store = store();
        let (housekeeping, _) = service(&store);

        let tasks = housekeeping
            .get_tasks_by_status(TaskStatus::Completed)
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, RecordId(2));
    }

    #[tokio::test]
    async fn test_start_stamps_start_time() {
        let store = store();
        let (housekeeping, notifier) = service(&store);
        let before = Utc::now();

        let task = housekeeping
            .set_task_status(RecordId(1), TaskStatus::InProgress, TaskPatch::new())
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.start_time.unwrap().timestamp_millis() >= before.timestamp_millis());
        assert!(task.completed_time.is_none());

        let notices = notifier.successes();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Task in progress");
    }

    #[tokio::test]
    async fn test_complete_stamps_completed_time_with_extras() {
        let store = store();
        let (housekeeping, _) = service(&store);
        let before = Utc::now();

        let task = housekeeping
            .set_task_status(
                RecordId(3),
                TaskStatus::Completed,
                TaskPatch::new().actual_time(35),
            )
            .await
            .unwrap();
        assert!(task.completed_time.unwrap().timestamp_millis() >= before.timestamp_millis());
        assert_eq!(task.actual_time, Some(35));
    }

    #[tokio::test]
    async fn test_reopening_keeps_completed_time() {
        let store = store();
        let (housekeeping, _) = service(&store);

        let task = housekeeping
            .set_task_status(RecordId(2), TaskStatus::Pending, TaskPatch::new())
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(
            task.completed_time.map(|t| t.to_rfc3339()),
            Some("2024-07-01T10:00:00+00:00".to_string())
        );
    }

    #[tokio::test]
    async fn test_status_update_failure_notifies_once() {
        let store = store();
        let (housekeeping, notifier) = service(&store);

        let err = housekeeping
            .set_task_status(RecordId(77), TaskStatus::Completed, TaskPatch::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Gateway(_)));
        assert_eq!(notifier.errors().len(), 1);
        assert!(notifier.successes().is_empty());
    }

    #[tokio::test]
    async fn test_strict_policy_blocks_skipping_ahead() {
        let store = store();
        let (housekeeping, _) = service(&store);
        let housekeeping = housekeeping.with_options(FacadeOptions {
            policy: TransitionPolicy::Strict,
            ..Default::default()
        });

        let err = housekeeping
            .set_task_status(RecordId(1), TaskStatus::Completed, TaskPatch::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(store.write_calls().await, 0);
    }

    #[tokio::test]
    async fn test_create_task_fills_defaults() {
        let store = store();
        let (housekeeping, notifier) = service(&store);

        let task = housekeeping
            .create_task(&NewTask::new("104".to_string(), RecordId(4)))
            .await
            .unwrap();
        assert_eq!(task.id, RecordId(4));
        assert_eq!(task.name.as_deref(), Some("Task for Room 104"));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.estimated_time, Some(30));
        assert_eq!(task.task_type, "standard_cleaning");
        assert_eq!(task.created_by.as_deref(), Some(DEFAULT_OPERATOR));
        assert_eq!(notifier.successes()[0].message, "Task created successfully");
    }

    #[tokio::test]
    async fn test_create_task_failure_propagates() {
        let store = store();
        let (housekeeping, notifier) = service(&store);
        store.set_offline(true).await;

        let result = housekeeping
            .create_task(&NewTask::new("104".to_string(), RecordId(4)))
            .await;
        assert!(result.is_err());
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_assign_task_copies_staff_name() {
        let store = store();
        let (housekeeping, notifier) = service(&store);

        let task = housekeeping
            .assign_task(RecordId(1), RecordId(5))
            .await
            .unwrap();
        assert_eq!(task.assigned_to, Some(RecordId(5)));
        assert_eq!(task.assigned_staff.as_deref(), Some("Maria Lopez"));
        assert_eq!(notifier.successes()[0].message, "Task assigned to Maria Lopez");
    }

    #[tokio::test]
    async fn test_assign_task_unknown_staff() {
        let store = store();
        let (housekeeping, _) = service(&store);

        let task = housekeeping
            .assign_task(RecordId(1), RecordId(99))
            .await
            .unwrap();
        assert_eq!(task.assigned_staff.as_deref(), Some("Unknown"));
    }

    #[tokio::test]
    async fn test_delete_task() {
        let store = store();
        let (housekeeping, notifier) = service(&store);

        housekeeping.delete_task(RecordId(1)).await.unwrap();
        assert!(store
            .record(Collection::HousekeepingTasks, RecordId(1))
            .await
            .is_none());

        let err = housekeeping.delete_task(RecordId(1)).await.unwrap_err();
        assert!(matches!(err, Error::Gateway(_)));
        assert_eq!(notifier.successes().len(), 1);
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_get_all_staff() {
        let store = store();
        let (housekeeping, _) = service(&store);

        let staff = housekeeping.get_all_staff().await.unwrap();
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].active_assignments, 2);
        assert_eq!(staff[0].completed_today, 0);
    }

    #[tokio::test]
    async fn test_compute_stats_over_store() {
        let store = store();
        let (housekeeping, _) = service(&store);

        let stats = housekeeping.compute_stats().await.unwrap();
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.average_time, 15);
        assert_eq!(stats.staff_stats.len(), 1);
    }

    #[tokio::test]
    async fn test_compute_stats_failure() {
        let store = store();
        let (housekeeping, notifier) = service(&store);
        store.refuse_calls(Some("Rate limited".to_string())).await;

        assert!(housekeeping.compute_stats().await.is_err());
        assert_eq!(notifier.errors().len(), 1);
    }
}
