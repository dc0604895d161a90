use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::{error::AppError, types::User, SharedState};

pub const USER_HEADER: &str = "x-user-id";

/// The user named by the `x-user-id` header, resolved against `users`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
	pub fn id(&self) -> i64 {
		self.0.id
	}
}

#[async_trait]
impl FromRequestParts<SharedState> for CurrentUser {
	type Rejection = AppError;

	async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
		let uid: i64 = parts
			.headers
			.get(USER_HEADER)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.trim().parse().ok())
			.ok_or_else(|| AppError::bad_request("User ID required"))?;

		let user = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = ?")
			.bind(uid)
			.fetch_optional(&state.db)
			.await?
			.ok_or_else(|| AppError::Unauthorized(format!("Unknown user {uid}")))?;

		debug!("request for user {} ({})", user.id, user.name);
		Ok(CurrentUser(user))
	}
}
