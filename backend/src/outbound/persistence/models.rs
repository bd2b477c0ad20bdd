//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types
//! re-validate stored values and report failures as plain strings, which the
//! repositories surface as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{comments, reviews, taxa, title_genres, titles, users};
use crate::domain::{
    Attribution, BodyText, CatalogueName, Comment, CommentId, Email, PersonName, Review, ReviewId,
    Role, Score, Slug, Taxon, TaxonId, TaxonomyKind, TitleId, User, UserId, UserProfile, Username,
};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_staff: bool,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |field: &str, err: &dyn std::fmt::Display| {
            format!("stored user {} has an invalid {field}: {err}", row.id)
        };
        Ok(Self {
            id: UserId::new(row.id),
            username: Username::new(row.username.as_str()).map_err(|e| invalid("username", &e))?,
            email: Email::new(row.email.as_str()).map_err(|e| invalid("email", &e))?,
            role: row.role.parse::<Role>().map_err(|e| invalid("role", &e))?,
            is_staff: row.is_staff,
            profile: UserProfile {
                first_name: PersonName::new(row.first_name.as_str())
                    .map_err(|e| invalid("first name", &e))?,
                last_name: PersonName::new(row.last_name.as_str())
                    .map_err(|e| invalid("last name", &e))?,
                bio: row.bio.clone(),
            },
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub bio: &'a str,
}

/// Changeset for partial account updates; `None` columns are left alone.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub role: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub bio: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Row struct for reading from the taxa table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = taxa)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TaxonRow {
    pub id: i64,
    pub kind: String,
    pub name: String,
    pub slug: String,
}

impl TryFrom<TaxonRow> for Taxon {
    type Error = String;

    fn try_from(row: TaxonRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaxonId::new(row.id),
            kind: row.kind.parse::<TaxonomyKind>()?,
            name: CatalogueName::new(&row.name)
                .map_err(|err| format!("stored taxon {} has an invalid name: {err}", row.id))?,
            slug: Slug::new(row.slug)
                .map_err(|err| format!("stored taxon {} has an invalid slug: {err}", row.id))?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = taxa)]
pub(crate) struct NewTaxonRow<'a> {
    pub kind: &'a str,
    pub name: &'a str,
    pub slug: &'a str,
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// Row struct for reading from the titles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = titles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TitleRow {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = titles)]
pub(crate) struct NewTitleRow<'a> {
    pub name: &'a str,
    pub year: i32,
    pub description: Option<&'a str>,
    pub category_id: Option<i64>,
}

/// Changeset for partial title updates.
///
/// Nullable columns use a nested option: `Some(None)` writes `NULL`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = titles)]
pub(crate) struct TitleChangeset<'a> {
    pub name: Option<&'a str>,
    pub year: Option<i32>,
    pub description: Option<Option<&'a str>>,
    pub category_id: Option<Option<i64>>,
}

impl TitleChangeset<'_> {
    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.year.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = title_genres)]
pub(crate) struct TitleGenreRow {
    pub title_id: i64,
    pub genre_id: i64,
}

// ---------------------------------------------------------------------------
// Reviews and comments
// ---------------------------------------------------------------------------

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: i64,
    pub title_id: i64,
    pub author_id: i64,
    pub text: String,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

impl ReviewRow {
    /// Combine the row with its author's username.
    pub(crate) fn into_review(self, username: String) -> Result<Review, String> {
        Ok(Review {
            id: ReviewId::new(self.id),
            title_id: TitleId::new(self.title_id),
            author: attribution(self.author_id, username)?,
            text: BodyText::new(self.text)
                .map_err(|err| format!("stored review {} has invalid text: {err}", self.id))?,
            score: Score::new(i64::from(self.score))
                .map_err(|err| format!("stored review {} has an invalid score: {err}", self.id))?,
            pub_date: self.pub_date,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub title_id: i64,
    pub author_id: i64,
    pub text: &'a str,
    pub score: i16,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = reviews)]
pub(crate) struct ReviewChangeset<'a> {
    pub text: Option<&'a str>,
    pub score: Option<i16>,
}

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: i64,
    pub review_id: i64,
    pub author_id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl CommentRow {
    /// Combine the row with its author's username.
    pub(crate) fn into_comment(self, username: String) -> Result<Comment, String> {
        Ok(Comment {
            id: CommentId::new(self.id),
            review_id: ReviewId::new(self.review_id),
            author: attribution(self.author_id, username)?,
            text: BodyText::new(self.text)
                .map_err(|err| format!("stored comment {} has invalid text: {err}", self.id))?,
            pub_date: self.pub_date,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub review_id: i64,
    pub author_id: i64,
    pub text: &'a str,
    pub pub_date: DateTime<Utc>,
}

fn attribution(author_id: i64, username: String) -> Result<Attribution, String> {
    Ok(Attribution {
        user_id: UserId::new(author_id),
        username: Username::new(username)
            .map_err(|err| format!("stored user {author_id} has an invalid username: {err}"))?,
    })
}
