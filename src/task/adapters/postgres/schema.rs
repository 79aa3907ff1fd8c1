//! Diesel schema for task persistence.

diesel::table! {
    /// Task records with their lifecycle status and latest evidence.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Task name.
        #[max_length = 100]
        name -> Varchar,
        /// Free-text description, possibly empty.
        #[max_length = 255]
        description -> Varchar,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Creating user.
        owner_id -> Uuid,
        /// Assigned user, if any.
        assignee_id -> Nullable<Uuid>,
        /// Deadline.
        end_date -> Timestamptz,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
        /// Time of the latest evidence submission.
        completed_at -> Nullable<Timestamptz>,
        /// Text evidence.
        proof_text -> Nullable<Text>,
        /// Media evidence reference.
        media_ref -> Nullable<Text>,
        /// Media evidence kind.
        #[max_length = 20]
        media_kind -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Identifiers of deleted tasks, kept so identifiers are never reused.
    task_tombstones (id) {
        /// Identifier of the deleted task.
        id -> Uuid,
        /// Deletion timestamp.
        deleted_at -> Timestamptz,
    }
}
