//! Shared wiring for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use super::cluster::TemporaryDatabase;
use chrono::TimeDelta;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::{Clock, DefaultClock};
use rstest::fixture;
use std::sync::Arc;
use taskbot::{
    messaging::domain::ChatId,
    task::{
        adapters::postgres::PostgresTaskRepository,
        domain::{Task, TaskId},
        services::{CreateTaskRequest, LifecycleEngine, TaskService},
    },
    user::{
        adapters::postgres::PostgresUserDirectory,
        domain::{DisplayName, Email, User},
        ports::UserDirectory,
    },
};
use uuid::Uuid;

/// SQL creating the users table.
pub const CREATE_USERS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_users/up.sql");

/// SQL creating the tasks and tombstone tables.
pub const CREATE_TASKS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000001_create_tasks/up.sql");

/// Template database carrying the migrated schema.
pub const TEMPLATE_DB: &str = "taskbot_test_template";

pub const OWNER_CHAT: i64 = 100;
pub const ASSIGNEE_CHAT: i64 = 200;

pub type PgEngine = LifecycleEngine<PostgresTaskRepository, DefaultClock>;
pub type PgTaskService = TaskService<PostgresTaskRepository, DefaultClock>;

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(CREATE_USERS_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(CREATE_TASKS_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(())
}

/// Repositories and services over a scratch database seeded with an owner
/// and an assignee.
pub struct PgContext {
    pub tasks: Arc<PostgresTaskRepository>,
    pub users: Arc<PostgresUserDirectory>,
    pub engine: Arc<PgEngine>,
    pub service: PgTaskService,
    pub owner: User,
    pub assignee: User,
    // Declared last so every pool handle is gone before the drop.
    _database: TemporaryDatabase,
}

impl PgContext {
    /// Creates a task from the owner to the assignee.
    pub async fn create_task(&self, name: &str) -> Result<Task, BoxError> {
        let request = CreateTaskRequest::new(
            self.owner.id(),
            name,
            DefaultClock.utc() + TimeDelta::days(1),
        )
        .with_assignee(self.assignee.id());
        Ok(self.service.create(request).await?)
    }

    /// Moves a task through accept and completion request into REVIEW.
    pub async fn task_in_review(&self, name: &str) -> Result<TaskId, BoxError> {
        let task_id = self.create_task(name).await?.id();
        self.engine.accept(task_id, self.assignee.id()).await?;
        self.engine
            .request_completion(task_id, self.assignee.id())
            .await?;
        Ok(task_id)
    }
}

/// Builds a user with a linked chat.
pub fn user(name: &str, chat: Option<i64>) -> Result<User, BoxError> {
    let mut user = User::new(
        Email::new(format!("{}@example.com", name.to_ascii_lowercase()))?,
        DisplayName::new(name)?,
        &DefaultClock,
    );
    user.link_chat(chat.map(ChatId::new));
    Ok(user)
}

async fn setup(cluster: PostgresCluster) -> Result<PgContext, BoxError> {
    let database = tokio::task::spawn_blocking(move || {
        cluster.ensure_template(TEMPLATE_DB, apply_migrations)?;
        cluster.temporary_database(&format!("taskbot_{}", Uuid::new_v4().simple()), TEMPLATE_DB)
    })
    .await
    .map_err(|err| Box::new(err) as BoxError)??;

    let pool = Pool::builder()
        .max_size(4)
        .build(ConnectionManager::<PgConnection>::new(database.url()))
        .map_err(|err| Box::new(err) as BoxError)?;
    let tasks = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let users = Arc::new(PostgresUserDirectory::new(pool));
    let clock = Arc::new(DefaultClock);

    let owner = user("Olga", Some(OWNER_CHAT))?;
    let assignee = user("Ivan", Some(ASSIGNEE_CHAT))?;
    users.store(&owner).await?;
    users.store(&assignee).await?;

    Ok(PgContext {
        engine: Arc::new(LifecycleEngine::new(Arc::clone(&tasks), Arc::clone(&clock))),
        service: TaskService::new(Arc::clone(&tasks), clock),
        tasks,
        users,
        owner,
        assignee,
        _database: database,
    })
}

/// Scratch context, or `None` when no cluster can run here.
#[fixture]
pub async fn pg_context(
    postgres_cluster: Option<PostgresCluster>,
) -> Result<Option<PgContext>, BoxError> {
    match postgres_cluster {
        Some(cluster) => Ok(Some(setup(cluster).await?)),
        None => Ok(None),
    }
}
