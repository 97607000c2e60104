use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::errors::{AppError, FieldErrors};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i64,
    pub professor_id: i64,
    pub author: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub creator_id: i64,
}

/// Body of `POST /professors/{id}/review/`. The same shape serves the
/// create and the update path: on create every field is required, on update
/// supplied fields overlay the stored review and absent ones are preserved.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewPayload {
    #[schema(example = "anon_student")]
    pub author: Option<String>,
    #[schema(example = 4)]
    pub rating: Option<i64>,
    #[schema(example = "Clear lectures, tough exams.")]
    pub comment: Option<String>,
}

#[derive(Debug)]
pub struct NewReview {
    pub author: String,
    pub rating: i64,
    pub comment: String,
}

impl ReviewPayload {
    /// Full validation for the create path: all fields required.
    pub fn validate_new(self) -> Result<NewReview, AppError> {
        let mut errors = FieldErrors::new();

        let author = match &self.author {
            None => {
                errors.insert("author".into(), "this field is required".into());
                None
            }
            Some(author) if author.trim().is_empty() => {
                errors.insert("author".into(), "this field may not be blank".into());
                None
            }
            Some(author) => Some(author.clone()),
        };

        if self.rating.is_none() {
            errors.insert("rating".into(), "this field is required".into());
        }

        let comment = match &self.comment {
            None => {
                errors.insert("comment".into(), "this field is required".into());
                None
            }
            Some(comment) if comment.trim().is_empty() => {
                errors.insert("comment".into(), "this field may not be blank".into());
                None
            }
            Some(comment) => Some(comment.clone()),
        };

        match (author, self.rating, comment) {
            (Some(author), Some(rating), Some(comment)) if errors.is_empty() => Ok(NewReview {
                author,
                rating,
                comment,
            }),
            _ => Err(AppError::validation(errors)),
        }
    }

    /// Partial validation for the update path: only supplied fields are
    /// checked, absent ones keep their stored values.
    pub fn validate_update(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();

        if matches!(self.author.as_deref(), Some(author) if author.trim().is_empty()) {
            errors.insert("author".into(), "this field may not be blank".into());
        }
        if matches!(self.comment.as_deref(), Some(comment) if comment.trim().is_empty()) {
            errors.insert("comment".into(), "this field may not be blank".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(errors))
        }
    }
}
