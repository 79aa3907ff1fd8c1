//! `PostgreSQL` repository implementation for task storage.
//!
//! Lifecycle transitions are a single conditional `UPDATE ... RETURNING`
//! whose `WHERE` clause carries the same role and source-status predicate as
//! [`authorize`](crate::task::domain::authorize), so the check and the write
//! cannot be interleaved with another transition.

use super::{
    models::{NewTaskRow, NewTombstoneRow, TaskDetailsChangeset, TaskRow, TransitionChangeset},
    schema::{task_tombstones, tasks},
};
use crate::task::{
    domain::{
        ActorRole, Evidence, MediaKind, PersistedTaskData, Task, TaskDescription, TaskId,
        TaskName, TaskStatus, TransitionCommand,
    },
    ports::{TaskFilter, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let tombstoned: i64 = task_tombstones::table
                    .filter(task_tombstones::id.eq(task_id.into_inner()))
                    .count()
                    .get_result(tx)?;
                if tombstoned > 0 {
                    return Err(TaskRepositoryError::DuplicateTask(task_id));
                }

                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changeset = TaskDetailsChangeset {
            name: task.name().as_str().to_owned(),
            description: task.description().as_str().to_owned(),
            assignee_id: task.assignee().map(UserId::into_inner),
            end_date: task.end_date(),
            updated_at: task.updated_at(),
        };

        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .set(&changeset)
                .execute(connection)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn query(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>> {
        let criteria = *filter;
        self.run_blocking(move |connection| {
            let mut query = tasks::table.select(TaskRow::as_select()).into_boxed();
            if let Some(owner) = criteria.owner {
                query = query.filter(tasks::owner_id.eq(owner.into_inner()));
            }
            if let Some(assignee) = criteria.assignee {
                query = query.filter(tasks::assignee_id.eq(assignee.into_inner()));
            }
            if let Some(status) = criteria.status {
                query = query.filter(tasks::status.eq(status.as_str()));
            }
            let rows = query
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn apply_transition(
        &self,
        command: &TransitionCommand,
    ) -> TaskRepositoryResult<Option<Task>> {
        let transition = command.transition();
        let task_id = command.task_id().into_inner();
        let actor = command.actor().into_inner();
        let sources: Vec<&'static str> = transition
            .source_statuses()
            .iter()
            .map(|status| status.as_str())
            .collect();
        let changeset = transition_changeset(command);

        self.run_blocking(move |connection| {
            let candidates = tasks::table
                .filter(tasks::id.eq(task_id))
                .filter(tasks::status.eq_any(sources));
            let row = match transition.actor_role() {
                ActorRole::Owner => diesel::update(candidates.filter(tasks::owner_id.eq(actor)))
                    .set(&changeset)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(connection)
                    .optional()?,
                ActorRole::Assignee => {
                    diesel::update(candidates.filter(tasks::assignee_id.eq(actor)))
                        .set(&changeset)
                        .returning(TaskRow::as_returning())
                        .get_result::<TaskRow>(connection)
                        .optional()?
                }
            };
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let deleted: Vec<uuid::Uuid> =
                    diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                        .returning(tasks::id)
                        .get_results(tx)?;
                bury(tx, &deleted)?;
                Ok(!deleted.is_empty())
            })
        })
        .await
    }

    async fn clear_assignee(&self, user: UserId) -> TaskRepositoryResult<usize> {
        self.run_blocking(move |connection| {
            let cleared =
                diesel::update(tasks::table.filter(tasks::assignee_id.eq(user.into_inner())))
                    .set(tasks::assignee_id.eq(None::<uuid::Uuid>))
                    .execute(connection)?;
            Ok(cleared)
        })
        .await
    }

    async fn delete_owned_by(&self, user: UserId) -> TaskRepositoryResult<usize> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let deleted: Vec<uuid::Uuid> =
                    diesel::delete(tasks::table.filter(tasks::owner_id.eq(user.into_inner())))
                        .returning(tasks::id)
                        .get_results(tx)?;
                bury(tx, &deleted)?;
                Ok(deleted.len())
            })
        })
        .await
    }
}

fn bury(connection: &mut PgConnection, ids: &[uuid::Uuid]) -> TaskRepositoryResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let rows: Vec<NewTombstoneRow> = ids.iter().map(|id| NewTombstoneRow { id: *id }).collect();
    diesel::insert_into(task_tombstones::table)
        .values(&rows)
        .on_conflict_do_nothing()
        .execute(connection)?;
    Ok(())
}

fn transition_changeset(command: &TransitionCommand) -> TransitionChangeset {
    let status = command.transition().target_status().as_str().to_owned();
    let at = command.at();
    match command.evidence() {
        None => TransitionChangeset {
            status,
            updated_at: at,
            completed_at: None,
            proof_text: None,
            media_ref: None,
            media_kind: None,
        },
        Some(evidence) => {
            let media = evidence.media_item();
            TransitionChangeset {
                status,
                updated_at: at,
                completed_at: Some(at),
                proof_text: Some(evidence.proof_text().map(str::to_owned)),
                media_ref: Some(media.map(|(reference, _)| reference.as_str().to_owned())),
                media_kind: Some(media.map(|(_, kind)| kind.as_str().to_owned())),
            }
        }
    }
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        name: task.name().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        owner_id: task.owner().into_inner(),
        assignee_id: task.assignee().map(UserId::into_inner),
        end_date: task.end_date(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_evidence(
    proof_text: Option<String>,
    media_ref: Option<String>,
    media_kind: Option<String>,
) -> TaskRepositoryResult<Option<Evidence>> {
    if let Some(proof) = proof_text {
        return Evidence::text(proof)
            .map(Some)
            .map_err(TaskRepositoryError::persistence);
    }
    match (media_ref, media_kind) {
        (Some(reference), Some(kind)) => {
            let parsed_kind =
                MediaKind::try_from(kind.as_str()).map_err(TaskRepositoryError::persistence)?;
            Evidence::media(parsed_kind, reference)
                .map(Some)
                .map_err(TaskRepositoryError::persistence)
        }
        _ => Ok(None),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        name,
        description,
        status,
        owner_id,
        assignee_id,
        end_date,
        created_at,
        updated_at,
        completed_at,
        proof_text,
        media_ref,
        media_kind,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        name: TaskName::new(name).map_err(TaskRepositoryError::persistence)?,
        description: TaskDescription::new(description)
            .map_err(TaskRepositoryError::persistence)?,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?,
        owner: UserId::from_uuid(owner_id),
        assignee: assignee_id.map(UserId::from_uuid),
        end_date,
        created_at,
        updated_at,
        completed_at,
        evidence: row_to_evidence(proof_text, media_ref, media_kind)?,
    };
    Task::from_persisted(data).map_err(TaskRepositoryError::persistence)
}
