use axum::{
	extract::State,
	http::StatusCode,
	routing::{delete, get, post, put},
	Json, Router,
};
use serde_json::{json, Value};

use crate::{
	db::{self, murajaah::ReviewOutcome, tahajjud::StreakAction},
	error::{AppError, AppResult},
	extract::{JsonBody, PathParam, QueryParams},
	sections::{self, SectionPlan, SectionRequest},
	time::iso_week,
	types::{
		DateParam, MemorizedSurah, Message, MurajaahForm, MurajaahLog, SabaqForm, SabaqRecord, SurahForm,
		SurahId, TahajjudForm, TahajjudSummary, WeeklyProgress,
	},
	user::CurrentUser,
	SharedState,
};

pub fn router() -> Router<SharedState> {
	Router::new()
		.route("/addsurah", post(add_surah))
		.route("/getmemorizedsurah", get(memorized_surahs))
		.route("/updatesurah/:id", put(update_surah))
		.route("/deletesurah/:id", delete(delete_surah))
		.route("/highlightedsurahs", get(highlighted_surahs))
		.route("/addmurajaah", post(add_murajaah))
		.route("/getmurajaahprogress", get(murajaah_progress))
		.route("/getweeklymurajaahprogress", get(weekly_murajaah_progress))
		.route("/sabaqtracker/add", post(add_sabaq))
		.route("/sabaqtracker/latest", get(latest_sabaq))
		.route("/sabaqtracker/sections", post(sabaq_sections))
		.route("/tahajjud/record", post(record_tahajjud))
		.route("/view_tahajjud_records", get(tahajjud_records))
		.route("/tahajjud/history/:week_offset", get(tahajjud_history))
		.route("/tahajjud/check_today_completion", get(tahajjud_today))
}

fn written(outcome: ReviewOutcome) -> (StatusCode, Json<Message>) {
	match outcome {
		ReviewOutcome::Inserted => (StatusCode::CREATED, Json(Message::new("Inserted Successfully"))),
		ReviewOutcome::Updated => (StatusCode::OK, Json(Message::new("Updated Successfully"))),
	}
}

async fn add_surah(
	State(state): State<SharedState>,
	user: CurrentUser,
	JsonBody(form): JsonBody<SurahForm>,
) -> AppResult<(StatusCode, Json<Message>)> {
	db::surah::insert(&state.db, user.id(), &form).await?;
	Ok((StatusCode::CREATED, Json(Message::new("Inserted Successfully"))))
}

async fn memorized_surahs(State(state): State<SharedState>, user: CurrentUser) -> AppResult<Json<Vec<MemorizedSurah>>> {
	Ok(Json(db::surah::list(&state.db, user.id()).await?))
}

async fn update_surah(
	State(state): State<SharedState>,
	user: CurrentUser,
	PathParam(id): PathParam<SurahId>,
	JsonBody(form): JsonBody<SurahForm>,
) -> AppResult<Json<Message>> {
	db::surah::update(&state.db, user.id(), id, &form).await?;
	Ok(Json(Message::new("Surah Updated Successfully")))
}

async fn delete_surah(
	State(state): State<SharedState>,
	user: CurrentUser,
	PathParam(id): PathParam<SurahId>,
) -> AppResult<Json<Message>> {
	db::surah::delete(&state.db, user.id(), id).await?;
	Ok(Json(Message::new("Surah Deleted Successfully")))
}

async fn highlighted_surahs(State(state): State<SharedState>, user: CurrentUser) -> AppResult<Json<Vec<MemorizedSurah>>> {
	Ok(Json(db::surah::highlighted(&state.db, user.id()).await?))
}

async fn add_murajaah(
	State(state): State<SharedState>,
	user: CurrentUser,
	JsonBody(form): JsonBody<MurajaahForm>,
) -> AppResult<(StatusCode, Json<Message>)> {
	let outcome = db::murajaah::record_review(&state.db, user.id(), form.surah_id, state.config.now()).await?;
	Ok(written(outcome))
}

async fn murajaah_progress(
	State(state): State<SharedState>,
	user: CurrentUser,
	QueryParams(param): QueryParams<DateParam>,
) -> AppResult<Json<Vec<MurajaahLog>>> {
	let date = param.date.ok_or_else(|| AppError::bad_request("Please provide a date."))?;
	Ok(Json(db::murajaah::logs_for_date(&state.db, user.id(), date).await?))
}

async fn weekly_murajaah_progress(
	State(state): State<SharedState>,
	user: CurrentUser,
	QueryParams(param): QueryParams<DateParam>,
) -> AppResult<Json<WeeklyProgress>> {
	let date = param
		.date
		.ok_or_else(|| AppError::bad_request("Please provide a date to determine the week."))?;
	let week = db::murajaah::weekly(&state.db, user.id(), date, state.config.utc_offset).await?;
	Ok(Json(week))
}

async fn add_sabaq(
	State(state): State<SharedState>,
	user: CurrentUser,
	JsonBody(form): JsonBody<SabaqForm>,
) -> AppResult<(StatusCode, Json<Message>)> {
	let outcome = db::sabaq::upsert(&state.db, user.id(), state.config.today(), &form).await?;
	Ok(written(outcome))
}

async fn latest_sabaq(State(state): State<SharedState>, user: CurrentUser) -> AppResult<Json<Option<SabaqRecord>>> {
	Ok(Json(db::sabaq::latest(&state.db, user.id()).await?))
}

async fn sabaq_sections(
	_user: CurrentUser,
	JsonBody(request): JsonBody<SectionRequest>,
) -> AppResult<Json<SectionPlan>> {
	Ok(Json(sections::plan(&request)?))
}

async fn record_tahajjud(
	State(state): State<SharedState>,
	user: CurrentUser,
	JsonBody(form): JsonBody<TahajjudForm>,
) -> AppResult<Json<Message>> {
	let night = form
		.current_date
		.ok_or_else(|| AppError::bad_request("No current date provided."))?;

	let message = match db::tahajjud::record(&state.db, user.id(), night).await? {
		StreakAction::AlreadyRecorded => "Tahajjud already recorded",
		StreakAction::Extend(_) | StreakAction::Start => "Tahajjud recorded successfully",
	};
	Ok(Json(Message::new(message)))
}

async fn tahajjud_records(State(state): State<SharedState>, user: CurrentUser) -> AppResult<Json<TahajjudSummary>> {
	let summary = db::tahajjud::summary(&state.db, user.id(), state.config.today()).await?;
	Ok(Json(summary))
}

async fn tahajjud_history(
	State(state): State<SharedState>,
	user: CurrentUser,
	PathParam(week_offset): PathParam<String>,
) -> AppResult<Json<Value>> {
	let offset = week_offset.trim().parse::<i64>().unwrap_or(0);
	let (start, end) = iso_week(state.config.today(), offset)
		.ok_or_else(|| AppError::bad_request("Week offset out of range"))?;
	let records = db::tahajjud::history(&state.db, user.id(), start, end).await?;

	Ok(Json(json!({
		"message": "Tahajjud history retrieved successfully",
		"historyRecords": records,
		"week": { "start": start, "end": end },
	})))
}

async fn tahajjud_today(State(state): State<SharedState>, user: CurrentUser) -> AppResult<Json<Value>> {
	let completed = db::tahajjud::completed_on(&state.db, user.id(), state.config.today()).await?;
	Ok(Json(json!({ "isCompleted": completed })))
}
