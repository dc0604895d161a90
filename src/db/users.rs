use tracing::info;

use crate::{
	error::{AppError, AppResult},
	sql::DB,
	types::{RegisterForm, User},
};

pub const PIN_LENGTH: usize = 4;

fn validate(form: &RegisterForm) -> AppResult<()> {
	if form.name.trim().is_empty() {
		return Err(AppError::bad_request("Name and pin are required"));
	}
	if form.pin.len() != PIN_LENGTH || !form.pin.bytes().all(|b| b.is_ascii_digit()) {
		return Err(AppError::bad_request(format!("Pin must be {PIN_LENGTH} digits")));
	}
	Ok(())
}

/// Creates a user, `Conflict` when the name is taken.
pub async fn register(db: &DB, form: &RegisterForm) -> AppResult<User> {
	validate(form)?;
	let name = form.name.trim();

	let user = sqlx::query_as::<_, User>(
		r#"
INSERT INTO users (name, pin) VALUES (?, ?)
ON CONFLICT(name) DO NOTHING
RETURNING id, name
		"#,
	)
	.bind(name)
	.bind(&form.pin)
	.fetch_optional(db)
	.await?
	.ok_or_else(|| AppError::Conflict(format!("User {name} already exists")))?;

	info!("registered user {} ({})", user.id, user.name);
	Ok(user)
}
