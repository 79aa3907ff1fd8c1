//! Diesel schema for user persistence.

diesel::table! {
    /// Registered users.
    users (id) {
        /// Internal user identifier.
        id -> Uuid,
        /// Unique, lower-cased email address.
        #[max_length = 255]
        email -> Varchar,
        /// Name shown in chat messages.
        #[max_length = 100]
        display_name -> Varchar,
        /// Linked private chat, unique when present.
        chat_id -> Nullable<Int8>,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}
