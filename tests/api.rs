use axum::{
	body::{to_bytes, Body},
	http::{header::CONTENT_TYPE, Method, Request, StatusCode},
	Router,
};
use chrono::{Datelike, Days, FixedOffset, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;

use murajaah_tracker::{
	app,
	config::Config,
	db::{self, murajaah::ReviewOutcome},
	new_shared_state, sql,
	time::weekday_name,
	types::{RegisterForm, SurahForm},
	SharedState,
};

const AIMAN: i64 = 1;
const OTHER: i64 = 2;

async fn setup() -> (Router, SharedState) {
	let db = sql::open(":memory:", 1).await.unwrap();
	let config = Config {
		port: 0,
		database_url: ":memory:".into(),
		max_connections: 1,
		utc_offset: FixedOffset::east_opt(8 * 3600).unwrap(),
		allowed_origins: vec!["http://localhost:3000".into()],
	};
	let state = new_shared_state(db, config);
	let app = app(state.clone());

	for (id, name, pin) in [(AIMAN, "Aiman", "1234"), (OTHER, "Other", "0000")] {
		let (status, body) = send(
			&app,
			Method::POST,
			"/users/register",
			None,
			Some(json!({ "name": name, "pin": pin })),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(body["user"]["id"], id);
	}
	(app, state)
}

async fn send(app: &Router, method: Method, uri: &str, user: Option<i64>, body: Option<Value>) -> (StatusCode, Value) {
	let mut request = Request::builder().method(method).uri(uri);
	if let Some(user) = user {
		request = request.header("x-user-id", user.to_string());
	}
	let request = match body {
		Some(body) => request
			.header(CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => request.body(Body::empty()).unwrap(),
	};

	let response = app.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	let value = serde_json::from_slice(&bytes)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
	(status, value)
}

async fn get(app: &Router, uri: &str, user: i64) -> (StatusCode, Value) {
	send(app, Method::GET, uri, Some(user), None).await
}

async fn post(app: &Router, uri: &str, user: i64, body: Value) -> (StatusCode, Value) {
	send(app, Method::POST, uri, Some(user), Some(body)).await
}

fn surah(id: f64, name: &str, total: i64, memorized: i64, juz: i64) -> Value {
	json!({
		"id": id,
		"chapter_name": name,
		"total_verse": total,
		"verse_memorized": memorized,
		"juz": juz,
	})
}

async fn seed_surahs(app: &Router, user: i64) {
	for body in [
		surah(1.0, "Al-Fatihah", 7, 7, 1),
		surah(112.0, "Al-Ikhlas", 4, 4, 30),
		surah(113.0, "Al-Falaq", 5, 5, 30),
		surah(114.0, "An-Nas", 6, 6, 30),
	] {
		let (status, _) = post(app, "/murajaah/addsurah", user, body).await;
		assert_eq!(status, StatusCode::CREATED);
	}
}

#[tokio::test]
async fn requests_need_a_known_user() {
	let (app, _) = setup().await;

	let (status, body) = send(&app, Method::GET, "/murajaah/getmemorizedsurah", None, None).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "User ID required");

	let (status, _) = get(&app, "/murajaah/getmemorizedsurah", 99).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, body) = get(&app, "/murajaah/getmemorizedsurah", AIMAN).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!([]));
}

#[tokio::test]
async fn surah_registry_crud() {
	let (app, _) = setup().await;
	seed_surahs(&app, AIMAN).await;

	let (status, _) = post(&app, "/murajaah/addsurah", AIMAN, surah(1.0, "Al-Fatihah", 7, 7, 1)).await;
	assert_eq!(status, StatusCode::CONFLICT);

	let (status, _) = post(&app, "/murajaah/addsurah", AIMAN, surah(2.0, "Al-Baqarah", 286, 300, 1)).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = post(&app, "/murajaah/addsurah", AIMAN, surah(67.0, "Al-Mulk", 30, 10, 29)).await;
	assert_eq!(status, StatusCode::CREATED);

	let mut section = surah(67.1, "Al-Mulk 1-10", 10, 10, 29);
	section["parent_id"] = json!(67.0);
	let (status, _) = post(&app, "/murajaah/addsurah", AIMAN, section).await;
	assert_eq!(status, StatusCode::CREATED);

	let mut orphan = surah(36.1, "Ya-Sin 1-12", 12, 12, 22);
	orphan["parent_id"] = json!(36.0);
	let (status, _) = post(&app, "/murajaah/addsurah", AIMAN, orphan).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (_, list) = get(&app, "/murajaah/getmemorizedsurah", AIMAN).await;
	let ids: Vec<f64> = list.as_array().unwrap().iter().map(|s| s["id"].as_f64().unwrap()).collect();
	assert_eq!(ids, vec![1.0, 67.0, 67.1, 112.0, 113.0, 114.0]);

	let (status, body) = send(
		&app,
		Method::PUT,
		"/murajaah/updatesurah/67",
		Some(AIMAN),
		Some(surah(67.0, "Al-Mulk", 30, 20, 29)),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["message"], "Surah Updated Successfully");

	let (status, _) = send(
		&app,
		Method::PUT,
		"/murajaah/updatesurah/2",
		Some(AIMAN),
		Some(surah(2.0, "Al-Baqarah", 286, 20, 1)),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// the sub-section goes with its parent
	let (status, _) = send(&app, Method::DELETE, "/murajaah/deletesurah/67", Some(AIMAN), None).await;
	assert_eq!(status, StatusCode::OK);
	let (_, list) = get(&app, "/murajaah/getmemorizedsurah", AIMAN).await;
	assert_eq!(list.as_array().unwrap().len(), 4);

	let (status, body) = send(&app, Method::DELETE, "/murajaah/deletesurah/67", Some(AIMAN), None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["message"], "Surah Not Found");

	let (_, list) = get(&app, "/murajaah/getmemorizedsurah", OTHER).await;
	assert_eq!(list, json!([]));
}

#[tokio::test]
async fn reviews_build_the_daily_log() {
	let (app, state) = setup().await;
	seed_surahs(&app, AIMAN).await;
	let today = state.config.today();

	let (status, body) = post(&app, "/murajaah/addmurajaah", AIMAN, json!({ "surah_id": 112.0 })).await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["message"], "Inserted Successfully");

	let (status, _) = post(&app, "/murajaah/addmurajaah", AIMAN, json!({ "surah_id": 112.0 })).await;
	assert_eq!(status, StatusCode::OK);
	let (status, _) = post(&app, "/murajaah/addmurajaah", AIMAN, json!({ "surah_id": 1.0 })).await;
	assert_eq!(status, StatusCode::OK);

	let (status, _) = post(&app, "/murajaah/addmurajaah", AIMAN, json!({ "surah_id": 2.0 })).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, logs) = get(&app, &format!("/murajaah/getmurajaahprogress?date={today}"), AIMAN).await;
	assert_eq!(status, StatusCode::OK);
	let logs = logs.as_array().unwrap();
	assert_eq!(logs.len(), 1);
	assert_eq!(logs[0]["surah_id"], json!([112.0, 1.0]));
	assert_eq!(logs[0]["completion_rate"].as_f64().unwrap(), 50.0);

	let (_, list) = get(&app, "/murajaah/getmemorizedsurah", AIMAN).await;
	let ikhlas = list.as_array().unwrap().iter().find(|s| s["id"] == json!(112.0)).unwrap();
	assert_eq!(ikhlas["murajaah_counter"], 2);

	let (_, highlighted) = get(&app, "/murajaah/highlightedsurahs", AIMAN).await;
	let order: Vec<f64> = highlighted.as_array().unwrap().iter().map(|s| s["id"].as_f64().unwrap()).collect();
	assert_eq!(order, vec![113.0, 114.0, 1.0, 112.0]);

	let (status, week) = get(&app, &format!("/murajaah/getweeklymurajaahprogress?date={today}"), AIMAN).await;
	assert_eq!(status, StatusCode::OK);
	let today_name = weekday_name(today.weekday());
	assert_eq!(week[today_name]["rate"], "50.00");
	let other_days = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"]
		.into_iter()
		.filter(|day| *day != today_name);
	for day in other_days {
		assert_eq!(week[day]["rate"], "0.00");
	}
	assert!(week["Sunday"]["day"].as_str().unwrap().ends_with("T00:00:00+08:00"));

	let (status, body) = get(&app, "/murajaah/getweeklymurajaahprogress", AIMAN).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "Please provide a date to determine the week.");

	// another user's log is separate
	let (_, logs) = get(&app, &format!("/murajaah/getmurajaahprogress?date={today}"), OTHER).await;
	assert_eq!(logs, json!([]));
}

#[tokio::test]
async fn sabaq_upserts_per_day() {
	let (app, _) = setup().await;

	let (status, latest) = get(&app, "/murajaah/sabaqtracker/latest", AIMAN).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(latest, Value::Null);

	let mut entry = json!({
		"chapter_number": 67,
		"chapter_name": "Al-Mulk",
		"page": 562,
		"section": 2,
		"verse": "5 - 7",
		"number_of_readings": 5,
		"complete_memorization": false,
		"murajaah_20_times": 0,
	});
	let (status, _) = post(&app, "/murajaah/sabaqtracker/add", AIMAN, entry.clone()).await;
	assert_eq!(status, StatusCode::CREATED);

	entry["number_of_readings"] = json!(20);
	entry["complete_memorization"] = json!(true);
	let (status, body) = post(&app, "/murajaah/sabaqtracker/add", AIMAN, entry.clone()).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["message"], "Updated Successfully");

	let (_, latest) = get(&app, "/murajaah/sabaqtracker/latest", AIMAN).await;
	assert_eq!(latest["number_of_readings"], 20);
	assert_eq!(latest["complete_memorization"], true);
	assert_eq!(latest["verse"], "5 - 7");

	entry["page"] = json!(605);
	let (status, _) = post(&app, "/murajaah/sabaqtracker/add", AIMAN, entry).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sabaq_sections_plan_a_page() {
	let (app, _) = setup().await;
	let ayahs: Vec<Value> = (1..=10)
		.map(|verse| json!({ "surah": 67, "verse": verse, "text": "تَبَارَكَ ٱلَّذِى" }))
		.collect();

	let (status, plan) = post(
		&app,
		"/murajaah/sabaqtracker/sections",
		AIMAN,
		json!({ "chapter_number": 67, "section": 2, "ayahs": ayahs }),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(plan["section"], 2);
	assert_eq!(plan["verse"], "3 - 4");
	assert_eq!(plan["sections"].as_array().unwrap().len(), 5);

	let (status, _) = post(
		&app,
		"/murajaah/sabaqtracker/sections",
		AIMAN,
		json!({ "chapter_number": 1, "ayahs": ayahs }),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// a saved verse range finds its section again
	let (status, plan) = post(
		&app,
		"/murajaah/sabaqtracker/sections",
		AIMAN,
		json!({ "chapter_number": 67, "verse": "5 - 6", "ayahs": ayahs }),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(plan["section"], 3);
	assert_eq!(plan["verse"], "5 - 6");

	let (status, body) = post(
		&app,
		"/murajaah/sabaqtracker/sections",
		AIMAN,
		json!({ "chapter_number": 67, "ayahs": [] }),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "Page has no ayahs");
}

#[tokio::test]
async fn tahajjud_streaks() {
	let (app, state) = setup().await;
	let today = state.config.today();
	let yesterday = today.checked_sub_days(Days::new(1)).unwrap();

	let (status, body) = post(&app, "/murajaah/tahajjud/record", AIMAN, json!({})).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "No current date provided.");

	for night in ["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-05"] {
		let (status, _) = post(&app, "/murajaah/tahajjud/record", AIMAN, json!({ "currentDate": night })).await;
		assert_eq!(status, StatusCode::OK);
	}
	let (_, body) = post(&app, "/murajaah/tahajjud/record", AIMAN, json!({ "currentDate": "2024-03-05" })).await;
	assert_eq!(body["message"], "Tahajjud already recorded");

	let (_, summary) = get(&app, "/murajaah/view_tahajjud_records", AIMAN).await;
	assert_eq!(summary["highestStreak"], 3);
	assert_eq!(summary["currentStreak"], 1);

	let (_, check) = get(&app, "/murajaah/tahajjud/check_today_completion", AIMAN).await;
	assert_eq!(check["isCompleted"], false);

	for night in [yesterday, today] {
		let (status, _) =
			post(&app, "/murajaah/tahajjud/record", AIMAN, json!({ "currentDate": night.to_string() })).await;
		assert_eq!(status, StatusCode::OK);
	}

	let (_, check) = get(&app, "/murajaah/tahajjud/check_today_completion", AIMAN).await;
	assert_eq!(check["isCompleted"], true);

	let (_, summary) = get(&app, "/murajaah/view_tahajjud_records", AIMAN).await;
	assert_eq!(summary["currentStreak"], 2);
	assert_eq!(summary["totalInCurrentMonth"], 2);
	assert_eq!(summary["totalInCurrentYear"], 2);

	let (status, history) = get(&app, "/murajaah/tahajjud/history/0", AIMAN).await;
	assert_eq!(status, StatusCode::OK);
	let records = history["historyRecords"].as_array().unwrap();
	assert_eq!(records.len(), 1);
	assert_eq!(records[0]["streak_count"], 2);
	assert_eq!(records[0]["dates"], json!([yesterday.to_string(), today.to_string()]));

	let (_, fallback) = get(&app, "/murajaah/tahajjud/history/soon", AIMAN).await;
	assert_eq!(fallback["week"], history["week"]);

	let (_, other) = get(&app, "/murajaah/view_tahajjud_records", OTHER).await;
	assert_eq!(other["highestStreak"], 0);
}

#[tokio::test]
async fn tilawah_progress_and_goals() {
	let (app, _) = setup().await;

	let (status, _) = get(&app, "/tilawah/progress", AIMAN).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = get(&app, "/tilawah/khatam-info", AIMAN).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, initial) = get(&app, "/tilawah/status", AIMAN).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(initial["last_page_recited"], 1);
	assert_eq!(initial["goal_type"], "once_month");
	assert!(initial["target_completion_date"].is_string());

	let (status, body) = post(&app, "/tilawah/update", AIMAN, json!({ "page_number": 0 })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "Page must be between 1 and 604");

	let (status, updated) = post(&app, "/tilawah/update", AIMAN, json!({ "page_number": 50 })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(updated["success"], true);
	assert_eq!(updated["page_number"], 50);

	let (_, logs) = get(&app, "/tilawah/logs?limit=10", AIMAN).await;
	assert_eq!(logs.as_array().unwrap().len(), 1);
	assert_eq!(logs[0]["page_number"], 50);

	let (_, progress) = get(&app, "/tilawah/progress", AIMAN).await;
	assert_eq!(progress["remaining_pages"], 554);
	assert_eq!(progress["daily_target"], 21);
	assert_eq!(progress["pages_to_complete_today"], 21);

	let (status, body) = post(&app, "/tilawah/set-khatam-goal", AIMAN, json!({ "goal_type": "weekly" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "Invalid goal type");

	let (status, set) = post(&app, "/tilawah/set-khatam-goal", AIMAN, json!({ "goal_type": "free" })).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(set["goal"]["goal_type"], "free");
	assert_eq!(set["goal"]["target_completion_date"], Value::Null);

	let (_, progress) = get(&app, "/tilawah/progress", AIMAN).await;
	assert_eq!(progress["goal_type"], "free");
	assert_eq!(progress["daily_target"], 20);

	let (_, info) = get(&app, "/tilawah/khatam-info", AIMAN).await;
	assert_eq!(info["pages_completed"], 50);
	assert_eq!(info["pages_remaining"], 554);
	assert_eq!(info["completion_percentage"], 8);
	assert_eq!(info["total_pages"], 604);
}

#[tokio::test]
async fn users_register_once() {
	let (app, _) = setup().await;

	let register = |name: &str, pin: &str| json!({ "name": name, "pin": pin });

	let (status, body) = send(&app, Method::POST, "/users/register", None, Some(register("Aiman", "9999"))).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["message"], "User Aiman already exists");

	let (status, body) = send(&app, Method::POST, "/users/register", None, Some(register("Hafiz", "12"))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["message"], "Pin must be 4 digits");

	let (status, body) = send(&app, Method::POST, "/users/register", None, Some(json!({ "name": "Hafiz" }))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["message"].as_str().unwrap().contains("pin"));

	let (status, body) = send(&app, Method::POST, "/users/register", None, Some(register(" Hafiz ", "4321"))).await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["message"], "User registered successfully");
	assert_eq!(body["user"]["name"], "Hafiz");

	let hafiz = body["user"]["id"].as_i64().unwrap();
	let (status, list) = get(&app, "/murajaah/getmemorizedsurah", hafiz).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(list, json!([]));
}

#[tokio::test]
async fn malformed_input_gets_a_json_bad_request() {
	let (app, _) = setup().await;

	let mut nameless = surah(1.0, "Al-Fatihah", 7, 7, 1);
	nameless.as_object_mut().unwrap().remove("chapter_name");
	let (status, body) = post(&app, "/murajaah/addsurah", AIMAN, nameless).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["message"].as_str().unwrap().contains("chapter_name"));

	let (status, body) = get(&app, "/murajaah/getmurajaahprogress?date=2024-13-45", AIMAN).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["message"].is_string());

	let (status, body) =
		post(&app, "/murajaah/tahajjud/record", AIMAN, json!({ "currentDate": "yesterday" })).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["message"].is_string());

	let (status, body) = send(
		&app,
		Method::PUT,
		"/murajaah/updatesurah/first",
		Some(AIMAN),
		Some(surah(1.0, "Al-Fatihah", 7, 7, 1)),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["message"].is_string());

	let (status, body) = get(&app, "/tilawah/logs?limit=lots", AIMAN).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["message"].is_string());
}

#[tokio::test]
async fn history_rejects_weeks_past_the_calendar() {
	let (app, _) = setup().await;

	for offset in ["200000000", "-200000000", "9223372036854775807"] {
		let (status, body) = get(&app, &format!("/murajaah/tahajjud/history/{offset}"), AIMAN).await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "offset {offset}");
		assert_eq!(body["message"], "Week offset out of range");
	}

	let (status, next) = get(&app, "/murajaah/tahajjud/history/-1", AIMAN).await;
	assert_eq!(status, StatusCode::OK);
	let (_, current) = get(&app, "/murajaah/tahajjud/history/0", AIMAN).await;
	assert!(next["week"]["start"].as_str().unwrap() > current["week"]["start"].as_str().unwrap());
}

#[tokio::test]
async fn deleted_surahs_stop_counting_toward_the_rate() {
	let (app, state) = setup().await;
	seed_surahs(&app, AIMAN).await;
	let today = state.config.today();

	for id in [1.0, 112.0] {
		post(&app, "/murajaah/addmurajaah", AIMAN, json!({ "surah_id": id })).await;
	}
	let (status, _) = send(&app, Method::DELETE, "/murajaah/deletesurah/112", Some(AIMAN), None).await;
	assert_eq!(status, StatusCode::OK);

	let (status, _) = post(&app, "/murajaah/addmurajaah", AIMAN, json!({ "surah_id": 1.0 })).await;
	assert_eq!(status, StatusCode::OK);

	let (_, logs) = get(&app, &format!("/murajaah/getmurajaahprogress?date={today}"), AIMAN).await;
	let rate = logs[0]["completion_rate"].as_f64().unwrap();
	// one of the three remaining surahs
	assert!((rate - 100.0 / 3.0).abs() < 1e-9, "rate {rate}");
	assert_eq!(logs[0]["surah_id"], json!([1.0, 112.0]));
}

#[tokio::test]
async fn surah_parents_cannot_loop() {
	let (app, _) = setup().await;

	let add = |id: f64, parent: Option<f64>| {
		let mut body = surah(id, "Al-Mulk", 30, 10, 29);
		body["parent_id"] = json!(parent);
		body
	};
	for (id, parent) in [(67.0, None), (67.1, Some(67.0)), (67.11, Some(67.1))] {
		let (status, _) = post(&app, "/murajaah/addsurah", AIMAN, add(id, parent)).await;
		assert_eq!(status, StatusCode::CREATED);
	}

	for parent in [67.1, 67.11] {
		let (status, body) =
			send(&app, Method::PUT, "/murajaah/updatesurah/67", Some(AIMAN), Some(add(67.0, Some(parent)))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "parent {parent}");
		assert!(body["message"].as_str().unwrap().contains("sub-section"));
	}

	let (status, _) =
		send(&app, Method::PUT, "/murajaah/updatesurah/67.11", Some(AIMAN), Some(add(67.11, Some(67.0)))).await;
	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn weekly_progress_reports_each_day() {
	let (app, state) = setup().await;

	for (day, rate) in [("2024-03-04", 25.0), ("2024-03-06", 75.0), ("2024-03-10", 100.0)] {
		sqlx::query("INSERT INTO murajaah_log (user_id, log_date, date_time, completion_rate) VALUES (?, ?, ?, ?)")
			.bind(AIMAN)
			.bind(NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap())
			.bind(format!("{day}T21:00:00+08:00"))
			.bind(rate)
			.execute(&state.db)
			.await
			.unwrap();
	}

	let (status, week) = get(&app, "/murajaah/getweeklymurajaahprogress?date=2024-03-06", AIMAN).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(week["Sunday"]["day"], "2024-03-03T00:00:00+08:00");
	assert_eq!(week["Sunday"]["rate"], "0.00");
	assert_eq!(week["Monday"]["rate"], "25.00");
	assert_eq!(week["Tuesday"]["rate"], "0.00");
	assert_eq!(week["Wednesday"]["rate"], "75.00");
	assert_eq!(week["Saturday"]["day"], "2024-03-09T00:00:00+08:00");
	assert_eq!(week["Saturday"]["rate"], "0.00");

	let (_, next) = get(&app, "/murajaah/getweeklymurajaahprogress?date=2024-03-10", AIMAN).await;
	assert_eq!(next["Sunday"]["rate"], "100.00");
	assert_eq!(next["Monday"]["rate"], "0.00");

	let (_, logs) = get(&app, "/murajaah/getmurajaahprogress?date=2024-03-04", AIMAN).await;
	assert_eq!(logs.as_array().unwrap().len(), 1);
	assert_eq!(logs[0]["completion_rate"].as_f64().unwrap(), 25.0);
}

#[tokio::test]
async fn free_goal_follows_logged_pace() {
	let (app, state) = setup().await;
	let today = state.config.today();

	get(&app, "/tilawah/status", AIMAN).await;
	for page in [100, 140, 170] {
		let (status, _) = post(&app, "/tilawah/update", AIMAN, json!({ "page_number": page })).await;
		assert_eq!(status, StatusCode::OK);
	}
	post(&app, "/tilawah/set-khatam-goal", AIMAN, json!({ "goal_type": "free" })).await;

	let (_, progress) = get(&app, "/tilawah/progress", AIMAN).await;
	// 70 pages over the week
	assert_eq!(progress["daily_target"], 10);
	assert_eq!(progress["remaining_pages"], 434);
	assert_eq!(progress["pages_to_complete_today"], 10);
	let eta = today.checked_add_days(Days::new(44)).unwrap();
	assert_eq!(progress["estimated_completion_date"], eta.to_string());

	let (_, latest) = get(&app, "/tilawah/logs?limit=0", AIMAN).await;
	assert_eq!(latest.as_array().unwrap().len(), 1);
	assert_eq!(latest[0]["page_number"], 170);

	let (_, all) = get(&app, "/tilawah/logs?limit=10000", AIMAN).await;
	let pages: Vec<i64> = all.as_array().unwrap().iter().map(|l| l["page_number"].as_i64().unwrap()).collect();
	assert_eq!(pages, vec![170, 140, 100]);

	let (_, default) = get(&app, "/tilawah/logs", AIMAN).await;
	assert_eq!(default.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn concurrent_first_reviews_share_one_log() {
	let path = std::env::temp_dir().join(format!("murajaah-concurrent-{}.db", std::process::id()));
	let remove = |path: &std::path::Path| {
		for suffix in ["", "-wal", "-shm"] {
			let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
		}
	};
	remove(&path);
	let url = format!("sqlite://{}", path.display());
	let pool = sql::open(&url, 4).await.unwrap();

	let user = db::users::register(&pool, &RegisterForm { name: "Aiman".into(), pin: "1234".into() })
		.await
		.unwrap();
	for id in 1..=6 {
		let form = SurahForm {
			id: Some(id as f64),
			parent_id: None,
			chapter_name: format!("Surah {id}"),
			total_verse: 7,
			verse_memorized: 7,
			juz: 1,
			note: None,
		};
		db::surah::insert(&pool, user.id, &form).await.unwrap();
	}

	let offset = FixedOffset::east_opt(8 * 3600).unwrap();
	let now = chrono::Utc::now().with_timezone(&offset);
	let reviews: Vec<_> = (1..=6)
		.map(|id| {
			let pool = pool.clone();
			tokio::spawn(async move { db::murajaah::record_review(&pool, user.id, id as f64, now).await })
		})
		.collect();

	let mut inserted = 0;
	for review in reviews {
		if review.await.unwrap().unwrap() == ReviewOutcome::Inserted {
			inserted += 1;
		}
	}
	assert_eq!(inserted, 1);

	let logs = db::murajaah::logs_for_date(&pool, user.id, now.date_naive()).await.unwrap();
	assert_eq!(logs.len(), 1);
	assert_eq!(logs[0].surah_id.len(), 6);
	assert_eq!(logs[0].completion_rate, 100.0);

	pool.close().await;
	remove(&path);
}
