use axum::{
	extract::State,
	routing::{get, post},
	Json, Router,
};

use crate::{
	db,
	error::{AppError, AppResult},
	extract::{JsonBody, QueryParams},
	khatam::{self, Projection},
	types::{
		KhatamGoal, KhatamGoalForm, KhatamGoalSet, KhatamInfo, LogsParam, TilawahLogEntry, TilawahStatus,
		TilawahUpdateForm, TilawahUpdated, TOTAL_PAGES,
	},
	user::CurrentUser,
	SharedState,
};

const DEFAULT_LOG_LIMIT: i64 = 30;
const MAX_LOG_LIMIT: i64 = 365;

pub fn router() -> Router<SharedState> {
	Router::new()
		.route("/status", get(status))
		.route("/update", post(update))
		.route("/logs", get(logs))
		.route("/progress", get(progress))
		.route("/set-khatam-goal", post(set_khatam_goal))
		.route("/khatam-info", get(khatam_info))
}

async fn status(State(state): State<SharedState>, user: CurrentUser) -> AppResult<Json<TilawahStatus>> {
	let status = match db::tilawah::status(&state.db, user.id()).await? {
		Some(status) => status,
		None => db::tilawah::initialize(&state.db, user.id(), state.config.now()).await?,
	};
	Ok(Json(status))
}

async fn update(
	State(state): State<SharedState>,
	user: CurrentUser,
	JsonBody(form): JsonBody<TilawahUpdateForm>,
) -> AppResult<Json<TilawahUpdated>> {
	let page = form
		.page_number
		.ok_or_else(|| AppError::bad_request(format!("Page must be between 1 and {TOTAL_PAGES}")))?;
	let now = state.config.now();
	db::tilawah::update_page(&state.db, user.id(), page, now).await?;

	Ok(Json(TilawahUpdated {
		success: true,
		page_number: page,
		update_date: now.date_naive(),
		update_time: now,
		message: "Page updated successfully".to_string(),
	}))
}

async fn logs(
	State(state): State<SharedState>,
	user: CurrentUser,
	QueryParams(param): QueryParams<LogsParam>,
) -> AppResult<Json<Vec<TilawahLogEntry>>> {
	let limit = param.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
	Ok(Json(db::tilawah::logs(&state.db, user.id(), limit).await?))
}

async fn progress(State(state): State<SharedState>, user: CurrentUser) -> AppResult<Json<Projection>> {
	let status = db::tilawah::status(&state.db, user.id())
		.await?
		.ok_or_else(|| AppError::not_found("Tilawah data not found"))?;

	let today = state.config.today();
	let pace = match status.goal_type {
		Some(KhatamGoal::Free) => db::tilawah::pace(&state.db, user.id(), today).await?,
		_ => khatam::Pace::default(),
	};

	Ok(Json(khatam::project(status.last_page_recited, status.goal_type, pace, today)))
}

async fn set_khatam_goal(
	State(state): State<SharedState>,
	user: CurrentUser,
	JsonBody(form): JsonBody<KhatamGoalForm>,
) -> AppResult<Json<KhatamGoalSet>> {
	let goal = form
		.goal_type
		.as_deref()
		.and_then(|raw| raw.parse::<KhatamGoal>().ok())
		.ok_or_else(|| AppError::bad_request("Invalid goal type"))?;

	let goal = db::tilawah::set_goal(&state.db, user.id(), goal, state.config.now()).await?;
	Ok(Json(KhatamGoalSet { success: true, goal }))
}

async fn khatam_info(State(state): State<SharedState>, user: CurrentUser) -> AppResult<Json<KhatamInfo>> {
	let (goal_type, target_completion_date, page) = db::tilawah::goal_with_page(&state.db, user.id())
		.await?
		.ok_or_else(|| AppError::not_found("Khatam goal not found"))?;

	// no tracker yet means nothing read
	let pages_completed = page.unwrap_or(0);

	Ok(Json(KhatamInfo {
		goal_type,
		target_completion_date,
		pages_completed,
		pages_remaining: TOTAL_PAGES - pages_completed,
		completion_percentage: khatam::completion_percentage(pages_completed),
		total_pages: TOTAL_PAGES,
	}))
}
