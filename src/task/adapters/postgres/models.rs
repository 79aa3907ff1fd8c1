//! Diesel row models for task persistence.

use super::schema::{task_tombstones, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Creating user.
    pub owner_id: uuid::Uuid,
    /// Assigned user.
    pub assignee_id: Option<uuid::Uuid>,
    /// Deadline.
    pub end_date: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Latest evidence submission time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Text evidence.
    pub proof_text: Option<String>,
    /// Media evidence reference.
    pub media_ref: Option<String>,
    /// Media evidence kind.
    pub media_kind: Option<String>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Creating user.
    pub owner_id: uuid::Uuid,
    /// Assigned user.
    pub assignee_id: Option<uuid::Uuid>,
    /// Deadline.
    pub end_date: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset for owner edits. `None` assignee clears the column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskDetailsChangeset {
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Assigned user.
    pub assignee_id: Option<uuid::Uuid>,
    /// Deadline.
    pub end_date: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset written by a lifecycle transition.
///
/// Outer `None` leaves a column untouched; `Some(None)` writes `NULL` so a
/// new submission replaces evidence of the other kind.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TransitionChangeset {
    /// New lifecycle status.
    pub status: String,
    /// Transition time.
    pub updated_at: DateTime<Utc>,
    /// Evidence submission time.
    pub completed_at: Option<DateTime<Utc>>,
    /// Text evidence.
    pub proof_text: Option<Option<String>>,
    /// Media evidence reference.
    pub media_ref: Option<Option<String>>,
    /// Media evidence kind.
    pub media_kind: Option<Option<String>>,
}

/// Insert model for deleted-task markers; `deleted_at` defaults to `now()`.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = task_tombstones)]
pub struct NewTombstoneRow {
    /// Identifier of the deleted task.
    pub id: uuid::Uuid,
}
