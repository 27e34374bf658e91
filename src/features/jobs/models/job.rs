use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Job lifecycle (PostgreSQL enum `job_status`)
///
/// ```text
/// open        -> {assigned, cancelled}
/// assigned    -> {in_progress, completed}
/// in_progress -> {completed}
/// completed, cancelled -> {}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Open,
        JobStatus::Assigned,
        JobStatus::InProgress,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Assigned => "assigned",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Open, Assigned)
                | (Open, Cancelled)
                | (Assigned, InProgress)
                | (Assigned, Completed)
                | (InProgress, Completed)
        )
    }

    /// A provider is attached and working; the job cannot be deleted
    pub fn is_active_work(self) -> bool {
        matches!(self, JobStatus::Assigned | JobStatus::InProgress)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for `jobs`
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub posted_by: Uuid,
    pub title: String,
    pub category_id: Uuid,
    pub description: String,
    pub budget: Option<String>,
    pub city: String,
    pub date_time: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub assigned_provider_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated job fields for insert
#[derive(Debug, Clone)]
pub struct NewJob {
    pub posted_by: Uuid,
    pub title: String,
    pub category_id: Uuid,
    pub description: String,
    pub budget: Option<String>,
    pub city: String,
    pub date_time: Option<DateTime<Utc>>,
}

/// Validated job fields for an edit of an open job
#[derive(Debug, Clone)]
pub struct JobChanges {
    pub title: String,
    pub category_id: Uuid,
    pub description: String,
    pub budget: Option<String>,
    pub city: String,
    pub date_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use JobStatus::*;

        let legal = [
            (Open, Assigned),
            (Open, Cancelled),
            (Assigned, InProgress),
            (Assigned, Completed),
            (InProgress, Completed),
        ];

        for from in JobStatus::ALL {
            for to in JobStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for status in [JobStatus::Completed, JobStatus::Cancelled] {
            assert!(JobStatus::ALL.iter().all(|to| !status.can_transition_to(*to)));
        }
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Open));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&JobStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert!(serde_json::from_str::<JobStatus>("\"reopened\"").is_err());
    }
}
