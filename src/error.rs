use axum::{
	extract::rejection::{JsonRejection, PathRejection, QueryRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
	#[error("{0}")]
	BadRequest(String),

	#[error("{0}")]
	Unauthorized(String),

	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	Conflict(String),

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
	pub fn bad_request(message: impl Into<String>) -> Self {
		AppError::BadRequest(message.into())
	}

	pub fn not_found(message: impl Into<String>) -> Self {
		AppError::NotFound(message.into())
	}

	pub fn status(&self) -> StatusCode {
		match self {
			AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
			AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			AppError::NotFound(_) => StatusCode::NOT_FOUND,
			AppError::Conflict(_) => StatusCode::CONFLICT,
			AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<JsonRejection> for AppError {
	fn from(rejection: JsonRejection) -> Self {
		AppError::BadRequest(rejection.body_text())
	}
}

impl From<QueryRejection> for AppError {
	fn from(rejection: QueryRejection) -> Self {
		AppError::BadRequest(rejection.body_text())
	}
}

impl From<PathRejection> for AppError {
	fn from(rejection: PathRejection) -> Self {
		AppError::BadRequest(rejection.body_text())
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let status = self.status();

		// storage details stay in the log
		let message = match &self {
			AppError::Database(e) => {
				error!("database error: {e}");
				"Server Error".to_string()
			}
			other => other.to_string(),
		};

		(status, Json(json!({ "message": message }))).into_response()
	}
}
