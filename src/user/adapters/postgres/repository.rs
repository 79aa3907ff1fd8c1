//! `PostgreSQL` implementation of the user directory.

use super::{
    models::{NewUserRow, UserRow},
    schema::users,
};
use crate::messaging::domain::ChatId;
use crate::user::{
    domain::{DisplayName, Email, PersistedUserData, User, UserId},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the user directory.
pub type UserPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed user directory.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: UserPgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: UserPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserDirectoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserDirectoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UserDirectoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(UserDirectoryError::persistence)?
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn store(&self, user: &User) -> UserDirectoryResult<()> {
        let snapshot = user.clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&to_new_row(&snapshot))
                .execute(connection)
                .map_err(|err| map_unique_violation(err, &snapshot))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, user: &User) -> UserDirectoryResult<()> {
        let snapshot = user.clone();
        self.run_blocking(move |connection| {
            let target = users::table.filter(users::id.eq(snapshot.id().into_inner()));
            let updated = diesel::update(target)
                .set((
                    users::display_name.eq(snapshot.display_name().as_str()),
                    users::chat_id.eq(snapshot.chat_id().map(ChatId::value)),
                ))
                .execute(connection)
                .map_err(|err| map_unique_violation(err, &snapshot))?;
            if updated == 0 {
                return Err(UserDirectoryError::NotFound(snapshot.id()));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserDirectoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_by_chat_id(&self, chat_id: ChatId) -> UserDirectoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::chat_id.eq(chat_id.value()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserDirectoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_by_email(&self, email: &Email) -> UserDirectoryResult<Option<User>> {
        let address = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::email.eq(&address))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserDirectoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn remove(&self, id: UserId) -> UserDirectoryResult<bool> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(users::table.filter(users::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(UserDirectoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }
}

fn to_new_row(user: &User) -> NewUserRow {
    NewUserRow {
        id: user.id().into_inner(),
        email: user.email().as_str().to_owned(),
        display_name: user.display_name().as_str().to_owned(),
        chat_id: user.chat_id().map(ChatId::value),
        created_at: user.created_at(),
    }
}

fn row_to_user(row: UserRow) -> UserDirectoryResult<User> {
    let UserRow {
        id,
        email,
        display_name,
        chat_id,
        created_at,
    } = row;
    let data = PersistedUserData {
        id: UserId::from_uuid(id),
        email: Email::new(email).map_err(UserDirectoryError::persistence)?,
        display_name: DisplayName::new(display_name).map_err(UserDirectoryError::persistence)?,
        chat_id: chat_id.map(ChatId::new),
        created_at,
    };
    Ok(User::from_persisted(data))
}

fn map_unique_violation(err: DieselError, user: &User) -> UserDirectoryError {
    let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) = err else {
        return UserDirectoryError::persistence(err);
    };
    match (constraint_name(info.as_ref()).as_deref(), user.chat_id()) {
        (Some("users_email_key"), _) => UserDirectoryError::DuplicateEmail(user.email().clone()),
        (Some("users_chat_id_key"), Some(chat_id)) => UserDirectoryError::DuplicateChat(chat_id),
        _ => UserDirectoryError::DuplicateUser(user.id()),
    }
}

fn constraint_name(info: &dyn DatabaseErrorInformation) -> Option<String> {
    info.constraint_name().map(str::to_owned)
}
