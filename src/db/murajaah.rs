use chrono::{DateTime, FixedOffset, NaiveDate};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::{
	error::{AppError, AppResult},
	sql::{self, DB},
	time::{local_midnight, sunday_week},
	types::{DayRate, MurajaahLog, SurahId, Uid, WeeklyProgress},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
	/// First review of the day, a new log row was written.
	Inserted,
	/// Today's log row already existed and was extended.
	Updated,
}

pub fn completion_rate(reviewed: i64, total: i64) -> f64 {
	if total <= 0 {
		return 0.0;
	}
	reviewed as f64 / total as f64 * 100.0
}

async fn reviewed_ids(conn: &mut SqliteConnection, log_id: i64) -> AppResult<Vec<SurahId>> {
	let ids: Vec<(SurahId,)> =
		sqlx::query_as("SELECT surah_id FROM murajaah_log_surah WHERE log_id = ? ORDER BY rowid")
			.bind(log_id)
			.fetch_all(conn)
			.await?;
	Ok(ids.into_iter().map(|(id,)| id).collect())
}

/// Counts one review of `surah_id` and folds it into the day's log row.
pub async fn record_review(
	db: &DB,
	uid: Uid,
	surah_id: SurahId,
	now: DateTime<FixedOffset>,
) -> AppResult<ReviewOutcome> {
	let today = now.date_naive();
	let mut tx = sql::begin_write(db).await?;

	let bumped = sqlx::query(
		"UPDATE memorized_surah SET murajaah_counter = murajaah_counter + 1 WHERE user_id = ? AND id = ?",
	)
	.bind(uid)
	.bind(surah_id)
	.execute(&mut *tx)
	.await?;
	if bumped.rows_affected() == 0 {
		return Err(AppError::not_found(format!("Surah {surah_id} not found")));
	}

	let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memorized_surah WHERE user_id = ?")
		.bind(uid)
		.fetch_one(&mut *tx)
		.await?;

	let existing: Option<(i64,)> =
		sqlx::query_as("SELECT id FROM murajaah_log WHERE user_id = ? AND log_date = ?")
			.bind(uid)
			.bind(today)
			.fetch_optional(&mut *tx)
			.await?;

	let (log_id, outcome) = match existing {
		Some((id,)) => (id, ReviewOutcome::Updated),
		None => {
			let inserted = sqlx::query(
				"INSERT INTO murajaah_log (user_id, log_date, date_time, completion_rate) VALUES (?, ?, ?, 0)",
			)
			.bind(uid)
			.bind(today)
			.bind(now)
			.execute(&mut *tx)
			.await?;
			(inserted.last_insert_rowid(), ReviewOutcome::Inserted)
		}
	};

	sqlx::query("INSERT OR IGNORE INTO murajaah_log_surah (log_id, surah_id) VALUES (?, ?)")
		.bind(log_id)
		.bind(surah_id)
		.execute(&mut *tx)
		.await?;

	// surahs deleted since their review no longer count
	let (reviewed,): (i64,) = sqlx::query_as(
		r#"
SELECT COUNT(*) FROM murajaah_log_surah ls
JOIN memorized_surah ms ON ms.user_id = ? AND ms.id = ls.surah_id
WHERE ls.log_id = ?
		"#,
	)
	.bind(uid)
	.bind(log_id)
	.fetch_one(&mut *tx)
	.await?;
	let rate = completion_rate(reviewed, total);

	sqlx::query("UPDATE murajaah_log SET date_time = ?, completion_rate = ? WHERE id = ?")
		.bind(now)
		.bind(rate)
		.bind(log_id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	info!("user {uid} reviewed surah {surah_id}: {reviewed}/{total} today ({rate:.2}%)");
	Ok(outcome)
}

pub async fn logs_for_date(db: &DB, uid: Uid, date: NaiveDate) -> AppResult<Vec<MurajaahLog>> {
	let mut conn = db.acquire().await?;

	let rows: Vec<(i64, Uid, DateTime<FixedOffset>, f64)> = sqlx::query_as(
		"SELECT id, user_id, date_time, completion_rate FROM murajaah_log WHERE user_id = ? AND log_date = ? ORDER BY id",
	)
	.bind(uid)
	.bind(date)
	.fetch_all(&mut *conn)
	.await?;

	let mut logs = Vec::with_capacity(rows.len());
	for (id, user_id, date_time, completion_rate) in rows {
		let surah_id = reviewed_ids(&mut conn, id).await?;
		logs.push(MurajaahLog { id, user_id, date_time, surah_id, completion_rate });
	}
	Ok(logs)
}

pub async fn weekly(db: &DB, uid: Uid, date: NaiveDate, offset: FixedOffset) -> AppResult<WeeklyProgress> {
	let days = sunday_week(date).ok_or_else(|| AppError::bad_request("Date is out of range"))?;

	let averages: Vec<(NaiveDate, f64)> = sqlx::query_as(
		r#"
SELECT log_date, AVG(completion_rate)
FROM murajaah_log
WHERE user_id = ? AND log_date BETWEEN ? AND ?
GROUP BY log_date
ORDER BY log_date ASC
		"#,
	)
	.bind(uid)
	.bind(days[0])
	.bind(days[6])
	.fetch_all(db)
	.await?;
	debug!("weekly progress for user {uid} from {}: {} active days", days[0], averages.len());

	let rate_for = |day: NaiveDate| DayRate {
		day: local_midnight(day, offset),
		rate: averages
			.iter()
			.find(|(d, _)| *d == day)
			.map(|(_, rate)| format!("{rate:.2}"))
			.unwrap_or_else(|| "0.00".to_string()),
	};

	Ok(WeeklyProgress {
		sunday: rate_for(days[0]),
		monday: rate_for(days[1]),
		tuesday: rate_for(days[2]),
		wednesday: rate_for(days[3]),
		thursday: rate_for(days[4]),
		friday: rate_for(days[5]),
		saturday: rate_for(days[6]),
	})
}
