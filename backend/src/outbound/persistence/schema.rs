//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly. Cascade deletes (domaine → wines
//! → reviews, user → reviews) and the `(wine_id, user_id)` uniqueness live in
//! the migrations; Diesel only needs the column types here.

diesel::table! {
    /// Registered accounts. `username` carries a unique index.
    users (id) {
        id -> Int4,
        username -> Varchar,
        password_hash -> Text,
        /// Either `user` or `admin`; flipped only by the make-admin tool.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Wine producers.
    domains (id) {
        id -> Int4,
        name -> Varchar,
        region -> Nullable<Varchar>,
        country -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Wines, each owned by one domaine.
    wines (id) {
        id -> Int4,
        domaine_id -> Int4,
        name -> Varchar,
        year -> Nullable<Int4>,
        grape -> Nullable<Varchar>,
        description_md -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews; `(wine_id, user_id)` is unique and `rating` is CHECKed to [1,5].
    reviews (id) {
        id -> Int4,
        wine_id -> Int4,
        user_id -> Int4,
        rating -> Int4,
        comment -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(wines -> domains (domaine_id));
diesel::joinable!(reviews -> wines (wine_id));
diesel::joinable!(reviews -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, domains, wines, reviews);
