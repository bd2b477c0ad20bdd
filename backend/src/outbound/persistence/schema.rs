//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When the
//! migrations change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` and `email` carry unique constraints
    /// (`users_username_key`, `users_email_key`).
    users (id) {
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
        /// One of `user`, `moderator`, `admin`.
        role -> Varchar,
        /// Superuser flag.
        is_staff -> Bool,
        first_name -> Varchar,
        last_name -> Varchar,
        bio -> Text,
        /// Hex SHA-256 digest of the active confirmation code.
        confirmation_code -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Categories and genres, kept apart by `kind`.
    taxa (id) {
        id -> Int8,
        /// Either `category` or `genre`.
        kind -> Varchar,
        name -> Varchar,
        slug -> Varchar,
    }
}

diesel::table! {
    /// Catalogue titles. `category_id` is cleared when the category is
    /// deleted.
    titles (id) {
        id -> Int8,
        name -> Varchar,
        year -> Int4,
        description -> Nullable<Text>,
        category_id -> Nullable<Int8>,
    }
}

diesel::table! {
    /// Title to genre association.
    title_genres (title_id, genre_id) {
        title_id -> Int8,
        genre_id -> Int8,
    }
}

diesel::table! {
    /// Reviews; at most one per (author, title) via
    /// `reviews_author_title_key`.
    reviews (id) {
        id -> Int8,
        title_id -> Int8,
        author_id -> Int8,
        text -> Text,
        score -> Int2,
        pub_date -> Timestamptz,
    }
}

diesel::table! {
    /// Comments attached to reviews.
    comments (id) {
        id -> Int8,
        review_id -> Int8,
        author_id -> Int8,
        text -> Text,
        pub_date -> Timestamptz,
    }
}

diesel::joinable!(titles -> taxa (category_id));
diesel::joinable!(title_genres -> titles (title_id));
diesel::joinable!(title_genres -> taxa (genre_id));
diesel::joinable!(reviews -> titles (title_id));
diesel::joinable!(reviews -> users (author_id));
diesel::joinable!(comments -> reviews (review_id));
diesel::joinable!(comments -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, taxa, titles, title_genres, reviews, comments);
