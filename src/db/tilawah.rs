use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use tracing::{debug, info};

use crate::{
	error::{AppError, AppResult},
	khatam::{Pace, PACE_WINDOW_DAYS},
	sql::DB,
	types::{KhatamGoal, KhatamGoalRecord, TilawahLogEntry, TilawahStatus, Uid, TOTAL_PAGES},
};

#[derive(Debug, Clone, sqlx::FromRow)]
struct StatusRow {
	last_page_recited: i64,
	last_update_date: NaiveDate,
	last_update_time: DateTime<FixedOffset>,
	goal_type: Option<String>,
	target_completion_date: Option<NaiveDate>,
}

fn parse_goal(raw: Option<String>) -> AppResult<Option<KhatamGoal>> {
	raw.map(|goal| goal.parse::<KhatamGoal>())
		.transpose()
		.map_err(|e| AppError::Database(sqlx::Error::Decode(e.into())))
}

pub fn target_date(goal: KhatamGoal, today: NaiveDate) -> Option<NaiveDate> {
	goal.days().and_then(|days| today.checked_add_days(Days::new(days as u64)))
}

pub async fn status(db: &DB, uid: Uid) -> AppResult<Option<TilawahStatus>> {
	let row = sqlx::query_as::<_, StatusRow>(
		r#"
SELECT t.last_page_recited, t.last_update_date, t.last_update_time, kg.goal_type, kg.target_completion_date
FROM tilawah_tracker t
LEFT JOIN khatam_goal kg ON kg.user_id = t.user_id
WHERE t.user_id = ?
		"#,
	)
	.bind(uid)
	.fetch_optional(db)
	.await?;

	row.map(|row| -> AppResult<TilawahStatus> {
		Ok(TilawahStatus {
			last_page_recited: row.last_page_recited,
			last_update_date: row.last_update_date,
			last_update_time: row.last_update_time,
			goal_type: parse_goal(row.goal_type)?,
			target_completion_date: row.target_completion_date,
		})
	})
	.transpose()
}

/// Starts a reader at page 1 with a monthly goal, leaving existing rows alone.
pub async fn initialize(db: &DB, uid: Uid, now: DateTime<FixedOffset>) -> AppResult<TilawahStatus> {
	let today = now.date_naive();
	let mut tx = db.begin().await?;

	sqlx::query(
		r#"
INSERT INTO tilawah_tracker (user_id, last_page_recited, last_update_date, last_update_time)
VALUES (?, 1, ?, ?)
ON CONFLICT(user_id) DO NOTHING
		"#,
	)
	.bind(uid)
	.bind(today)
	.bind(now)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		r#"
INSERT INTO khatam_goal (user_id, goal_type, target_completion_date, created_at, updated_at)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT(user_id) DO NOTHING
		"#,
	)
	.bind(uid)
	.bind(KhatamGoal::OnceMonth.as_str())
	.bind(target_date(KhatamGoal::OnceMonth, today))
	.bind(now)
	.bind(now)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	info!("initialized tilawah tracking for user {uid}");

	status(db, uid)
		.await?
		.ok_or_else(|| AppError::not_found("Tilawah data not found"))
}

pub async fn update_page(db: &DB, uid: Uid, page: i64, now: DateTime<FixedOffset>) -> AppResult<()> {
	if !(1..=TOTAL_PAGES).contains(&page) {
		return Err(AppError::bad_request(format!("Page must be between 1 and {TOTAL_PAGES}")));
	}
	let today = now.date_naive();
	let mut tx = db.begin().await?;

	sqlx::query(
		r#"
INSERT INTO tilawah_tracker (user_id, last_page_recited, last_update_date, last_update_time)
VALUES (?, ?, ?, ?)
ON CONFLICT(user_id) DO UPDATE SET
	last_page_recited = excluded.last_page_recited,
	last_update_date = excluded.last_update_date,
	last_update_time = excluded.last_update_time
		"#,
	)
	.bind(uid)
	.bind(page)
	.bind(today)
	.bind(now)
	.execute(&mut *tx)
	.await?;

	sqlx::query("INSERT INTO tilawah_update_log (user_id, page_number, update_date, update_time) VALUES (?, ?, ?, ?)")
		.bind(uid)
		.bind(page)
		.bind(today)
		.bind(now)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;
	debug!("user {uid} is on page {page}");
	Ok(())
}

pub async fn logs(db: &DB, uid: Uid, limit: i64) -> AppResult<Vec<TilawahLogEntry>> {
	let rows = sqlx::query_as::<_, TilawahLogEntry>(
		r#"
SELECT id, page_number, update_date, update_time, notes
FROM tilawah_update_log
WHERE user_id = ?
ORDER BY update_time DESC, id DESC
LIMIT ?
		"#,
	)
	.bind(uid)
	.bind(limit)
	.fetch_all(db)
	.await?;
	Ok(rows)
}

pub async fn pace(db: &DB, uid: Uid, today: NaiveDate) -> AppResult<Pace> {
	let since = today
		.checked_sub_days(Days::new(PACE_WINDOW_DAYS as u64))
		.unwrap_or(today);

	let pace = sqlx::query_as::<_, Pace>(
		r#"
SELECT COUNT(*) AS log_count, MIN(page_number) AS min_page, MAX(page_number) AS max_page
FROM tilawah_update_log
WHERE user_id = ? AND update_date >= ?
		"#,
	)
	.bind(uid)
	.bind(since)
	.fetch_one(db)
	.await?;
	Ok(pace)
}

pub async fn set_goal(db: &DB, uid: Uid, goal: KhatamGoal, now: DateTime<FixedOffset>) -> AppResult<KhatamGoalRecord> {
	let target = target_date(goal, now.date_naive());

	let (id,): (i64,) = sqlx::query_as(
		r#"
INSERT INTO khatam_goal (user_id, goal_type, target_completion_date, created_at, updated_at)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT(user_id) DO UPDATE SET
	goal_type = excluded.goal_type,
	target_completion_date = excluded.target_completion_date,
	updated_at = excluded.updated_at
RETURNING id
		"#,
	)
	.bind(uid)
	.bind(goal.as_str())
	.bind(target)
	.bind(now)
	.bind(now)
	.fetch_one(db)
	.await?;

	info!("user {uid} set khatam goal {}", goal.as_str());
	Ok(KhatamGoalRecord { id, user_id: uid, goal_type: goal, target_completion_date: target })
}

/// Goal plus the page reached, `None` until a goal exists.
pub async fn goal_with_page(db: &DB, uid: Uid) -> AppResult<Option<(KhatamGoal, Option<NaiveDate>, Option<i64>)>> {
	let row: Option<(String, Option<NaiveDate>, Option<i64>)> = sqlx::query_as(
		r#"
SELECT kg.goal_type, kg.target_completion_date, t.last_page_recited
FROM khatam_goal kg
LEFT JOIN tilawah_tracker t ON t.user_id = kg.user_id
WHERE kg.user_id = ?
		"#,
	)
	.bind(uid)
	.fetch_optional(db)
	.await?;

	match row {
		Some((goal, target, page)) => Ok(parse_goal(Some(goal))?.map(|goal| (goal, target, page))),
		None => Ok(None),
	}
}
