use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::errors::{AppError, FieldErrors};
use crate::models::review::Review;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Professor {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub email: String,
    pub office: String,
    /// Arithmetic mean of the professor's review ratings, one decimal place.
    /// Maintained by the review handlers, never accepted from a request.
    pub rating: f64,
    pub creator_id: Option<i64>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbProfessor {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub email: String,
    pub office: String,
    pub rating: f64,
    pub creator_id: Option<i64>,
}

impl DbProfessor {
    pub fn with_reviews(self, reviews: Vec<Review>) -> Professor {
        Professor {
            id: self.id,
            name: self.name,
            department: self.department,
            email: self.email,
            office: self.office,
            rating: self.rating,
            creator_id: self.creator_id,
            reviews,
        }
    }
}

/// Fields are optional so missing ones surface as field-level validation
/// errors instead of a body-deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfessorCreateRequest {
    #[schema(example = "Alice Smith")]
    pub name: Option<String>,
    #[schema(example = "Computer Science")]
    pub department: Option<String>,
    #[schema(example = "alice.smith@university.edu")]
    pub email: Option<String>,
    #[schema(example = "IT 4.12")]
    pub office: Option<String>,
}

#[derive(Debug)]
pub struct NewProfessor {
    pub name: String,
    pub department: String,
    pub email: String,
    pub office: String,
}

impl ProfessorCreateRequest {
    pub fn validate(self) -> Result<NewProfessor, AppError> {
        let mut errors = FieldErrors::new();

        let name = require_text(&mut errors, "name", self.name);
        let department = require_text(&mut errors, "department", self.department);
        let office = require_text(&mut errors, "office", self.office);

        let email = require_text(&mut errors, "email", self.email);
        if let Some(email) = email.as_deref() {
            if !looks_like_email(email) {
                errors.insert("email".into(), "enter a valid email address".into());
            }
        }

        match (name, department, email, office) {
            (Some(name), Some(department), Some(email), Some(office)) if errors.is_empty() => {
                Ok(NewProfessor {
                    name,
                    department,
                    email,
                    office,
                })
            }
            _ => Err(AppError::validation(errors)),
        }
    }
}

fn require_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    match value {
        None => {
            errors.insert(field.into(), "this field is required".into());
            None
        }
        Some(value) if value.trim().is_empty() => {
            errors.insert(field.into(), "this field may not be blank".into());
            None
        }
        Some(value) => Some(value),
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
