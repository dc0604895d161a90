use chrono::{Days, NaiveDate};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::{
	error::AppResult,
	sql::{self, DB},
	time::{month_bounds, year_bounds},
	types::{TahajjudStreak, TahajjudSummary, Uid},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakAction {
	AlreadyRecorded,
	/// The night follows the latest streak's last night.
	Extend(i64),
	Start,
}

/// Decides what recording `night` does given the latest streak `(id, last night)`.
pub fn next_action(latest: Option<(i64, NaiveDate)>, night: NaiveDate, already_recorded: bool) -> StreakAction {
	if already_recorded {
		return StreakAction::AlreadyRecorded;
	}
	match latest {
		Some((id, last)) if last.checked_add_days(Days::new(1)) == Some(night) => StreakAction::Extend(id),
		_ => StreakAction::Start,
	}
}

pub async fn record(db: &DB, uid: Uid, night: NaiveDate) -> AppResult<StreakAction> {
	let mut tx = sql::begin_write(db).await?;

	let (recorded,): (i64,) = sqlx::query_as(
		r#"
SELECT COUNT(*) FROM tahajjud_night n
JOIN tahajjud_tracker t ON t.id = n.tracker_id
WHERE t.user_id = ? AND n.night = ?
		"#,
	)
	.bind(uid)
	.bind(night)
	.fetch_one(&mut *tx)
	.await?;

	let latest: Option<(i64, NaiveDate)> = sqlx::query_as(
		r#"
SELECT t.id, MAX(n.night)
FROM tahajjud_tracker t
JOIN tahajjud_night n ON n.tracker_id = t.id
WHERE t.user_id = ?
GROUP BY t.id
ORDER BY t.id DESC
LIMIT 1
		"#,
	)
	.bind(uid)
	.fetch_optional(&mut *tx)
	.await?;

	let action = next_action(latest, night, recorded > 0);
	match action {
		StreakAction::AlreadyRecorded => {}
		StreakAction::Extend(id) => {
			sqlx::query("UPDATE tahajjud_tracker SET streak_count = streak_count + 1 WHERE id = ?")
				.bind(id)
				.execute(&mut *tx)
				.await?;
			add_night(&mut tx, id, night).await?;
		}
		StreakAction::Start => {
			let id = sqlx::query("INSERT INTO tahajjud_tracker (user_id, streak_count) VALUES (?, 1)")
				.bind(uid)
				.execute(&mut *tx)
				.await?
				.last_insert_rowid();
			add_night(&mut tx, id, night).await?;
		}
	}

	tx.commit().await?;
	info!("tahajjud for user {uid} on {night}: {action:?}");
	Ok(action)
}

async fn add_night(conn: &mut SqliteConnection, tracker_id: i64, night: NaiveDate) -> AppResult<()> {
	sqlx::query("INSERT INTO tahajjud_night (tracker_id, night) VALUES (?, ?)")
		.bind(tracker_id)
		.bind(night)
		.execute(conn)
		.await?;
	Ok(())
}

/// Sum of the streak counts of every streak with a night inside `[from, to]`.
async fn streak_total(db: &DB, uid: Uid, from: NaiveDate, to: NaiveDate) -> AppResult<i64> {
	let (total,): (i64,) = sqlx::query_as(
		r#"
SELECT COALESCE(SUM(streak_count), 0)
FROM tahajjud_tracker
WHERE user_id = ? AND id IN (SELECT tracker_id FROM tahajjud_night WHERE night BETWEEN ? AND ?)
		"#,
	)
	.bind(uid)
	.bind(from)
	.bind(to)
	.fetch_one(db)
	.await?;
	Ok(total)
}

pub async fn summary(db: &DB, uid: Uid, today: NaiveDate) -> AppResult<TahajjudSummary> {
	let (highest_streak,): (i64,) =
		sqlx::query_as("SELECT COALESCE(MAX(streak_count), 0) FROM tahajjud_tracker WHERE user_id = ?")
			.bind(uid)
			.fetch_one(db)
			.await?;

	let current_streak: Option<(i64,)> =
		sqlx::query_as("SELECT streak_count FROM tahajjud_tracker WHERE user_id = ? ORDER BY id DESC LIMIT 1")
			.bind(uid)
			.fetch_optional(db)
			.await?;

	let (month_start, month_end) = month_bounds(today);
	let (year_start, year_end) = year_bounds(today);

	Ok(TahajjudSummary {
		highest_streak,
		current_streak: current_streak.map(|(count,)| count).unwrap_or(0),
		total_in_current_month: streak_total(db, uid, month_start, month_end).await?,
		total_in_current_year: streak_total(db, uid, year_start, year_end).await?,
	})
}

/// Streaks with any night in `[from, to]`, each listed once with all of its nights.
pub async fn history(db: &DB, uid: Uid, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<TahajjudStreak>> {
	let mut conn = db.acquire().await?;

	let trackers: Vec<(i64, i64)> = sqlx::query_as(
		r#"
SELECT id, streak_count
FROM tahajjud_tracker
WHERE user_id = ? AND id IN (SELECT tracker_id FROM tahajjud_night WHERE night BETWEEN ? AND ?)
ORDER BY id ASC
		"#,
	)
	.bind(uid)
	.bind(from)
	.bind(to)
	.fetch_all(&mut *conn)
	.await?;

	let mut streaks = Vec::with_capacity(trackers.len());
	for (id, streak_count) in trackers {
		let nights: Vec<(NaiveDate,)> =
			sqlx::query_as("SELECT night FROM tahajjud_night WHERE tracker_id = ? ORDER BY night ASC")
				.bind(id)
				.fetch_all(&mut *conn)
				.await?;
		streaks.push(TahajjudStreak { id, dates: nights.into_iter().map(|(d,)| d).collect(), streak_count });
	}

	debug!("{} tahajjud streaks for user {uid} between {from} and {to}", streaks.len());
	Ok(streaks)
}

pub async fn completed_on(db: &DB, uid: Uid, night: NaiveDate) -> AppResult<bool> {
	let found: Option<(i64,)> = sqlx::query_as(
		r#"
SELECT n.tracker_id FROM tahajjud_night n
JOIN tahajjud_tracker t ON t.id = n.tracker_id
WHERE t.user_id = ? AND n.night = ?
LIMIT 1
		"#,
	)
	.bind(uid)
	.bind(night)
	.fetch_optional(db)
	.await?;
	Ok(found.is_some())
}
