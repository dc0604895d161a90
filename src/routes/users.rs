use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::{
	db,
	error::AppResult,
	extract::JsonBody,
	types::{RegisterForm, Registered},
	SharedState,
};

pub fn router() -> Router<SharedState> {
	Router::new().route("/register", post(register))
}

async fn register(
	State(state): State<SharedState>,
	JsonBody(form): JsonBody<RegisterForm>,
) -> AppResult<(StatusCode, Json<Registered>)> {
	let user = db::users::register(&state.db, &form).await?;
	Ok((
		StatusCode::CREATED,
		Json(Registered { message: "User registered successfully".to_string(), user }),
	))
}
