//! Housekeeping summary figures, reduced in memory from full fetches

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{HousekeepingTask, Staff, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HousekeepingStats {
    pub total_tasks: usize,
    pub pending_tasks: usize,
    pub in_progress_tasks: usize,
    pub completed_today: usize,
    /// Mean minutes over tasks with a recorded positive duration
    pub average_time: i64,
    pub staff_stats: Vec<Staff>,
}

/// Reduce the task and staff lists into summary figures.
///
/// "Today" is the calendar date of `now` in `now`'s own time zone; completion
/// times are converted into that zone before comparing dates.
pub fn compute_stats<Tz: TimeZone>(
    tasks: &[HousekeepingTask],
    staff: Vec<Staff>,
    now: &DateTime<Tz>,
) -> HousekeepingStats {
    let zone = now.timezone();
    let today = now.date_naive();

    let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

    let completed_today = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .filter_map(|t| t.completed_time)
        .filter(|done| done.with_timezone(&zone).date_naive() == today)
        .count();

    let durations: Vec<i64> = tasks
        .iter()
        .filter_map(|t| t.actual_time)
        .filter(|minutes| *minutes > 0)
        .collect();
    let average_time = if durations.is_empty() {
        0
    } else {
        (durations.iter().sum::<i64>() as f64 / durations.len() as f64).round() as i64
    };

    HousekeepingStats {
        total_tasks: tasks.len(),
        pending_tasks: count(TaskStatus::Pending),
        in_progress_tasks: count(TaskStatus::InProgress),
        completed_today,
        average_time,
        staff_stats: staff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use chrono::{Duration, FixedOffset, Utc};

    fn task(id: i64, status: TaskStatus, actual_time: Option<i64>) -> HousekeepingTask {
        let mut task = HousekeepingTask::new(RecordId(id), format!("{}", 100 + id), status);
        task.actual_time = actual_time;
        task
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_stats(&[], Vec::new(), &Utc::now());
        assert_eq!(stats, HousekeepingStats::default());
        assert_eq!(stats.average_time, 0);
    }

    #[test]
    fn test_average_skips_missing_times() {
        let tasks = vec![
            task(1, TaskStatus::Completed, Some(10)),
            task(2, TaskStatus::Completed, Some(20)),
            task(3, TaskStatus::Pending, None),
        ];
        let stats = compute_stats(&tasks, Vec::new(), &Utc::now());
        assert_eq!(stats.average_time, 15);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.pending_tasks, 1);
    }

    #[test]
    fn test_average_rounds_and_ignores_non_positive() {
        let tasks = vec![
            task(1, TaskStatus::Completed, Some(10)),
            task(2, TaskStatus::Completed, Some(11)),
            task(3, TaskStatus::Completed, Some(0)),
            task(4, TaskStatus::Completed, Some(-5)),
        ];
        let stats = compute_stats(&tasks, Vec::new(), &Utc::now());
        // 10.5 rounds up
        assert_eq!(stats.average_time, 11);
    }

    #[test]
    fn test_completed_today_uses_local_date() {
        // 23:30 on 1 July in UTC+02:00 is 21:30 UTC
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2024, 7, 1, 23, 30, 0).unwrap();

        let mut early = task(1, TaskStatus::Completed, None);
        // 23:15 UTC on 30 June is 01:15 on 1 July locally
        early.completed_time = Some(Utc.with_ymd_and_hms(2024, 6, 30, 23, 15, 0).unwrap());

        let mut yesterday = task(2, TaskStatus::Completed, None);
        yesterday.completed_time = Some(Utc.with_ymd_and_hms(2024, 6, 30, 21, 0, 0).unwrap());

        let mut reopened = task(3, TaskStatus::Pending, None);
        reopened.completed_time = Some(now.with_timezone(&Utc) - Duration::minutes(5));

        let mut started = task(4, TaskStatus::InProgress, None);
        started.start_time = Some(now.with_timezone(&Utc));

        let stats = compute_stats(&[early, yesterday, reopened, started], Vec::new(), &now);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.pending_tasks, 1);
    }
}
