use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Every failure a request can end in. The variant decides the HTTP status,
/// the display text is what the caller reads.
#[derive(Debug, Display)]
pub enum AppError {
    /// Missing or malformed input.
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Reported position is outside the premises radius.
    #[display(
        fmt = "You are not within the premises ({}). Distance: {:.2} km",
        premises,
        distance_km
    )]
    Geofence { premises: String, distance_km: f64 },

    /// The request is well formed but the attendance state forbids it.
    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "storage error: {}", _0)]
    Storage(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Geofence { .. } => StatusCode::FORBIDDEN,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // storage details stay in the log
            AppError::Storage(_) => {
                "An error occurred processing your request. Contact the system administrator."
                    .to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database operation failed");
        AppError::Storage(e.to_string())
    }
}

/// Unique-key violation only; foreign-key and NOT NULL failures share
/// SQLSTATE 23000 in MySQL but are not duplicates.
pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
