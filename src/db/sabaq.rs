use chrono::NaiveDate;
use tracing::debug;

use crate::{
	db::murajaah::ReviewOutcome,
	error::{AppError, AppResult},
	sql::{self, DB},
	types::{SabaqForm, SabaqRecord, Uid, SECTIONS_PER_PAGE, TOTAL_PAGES},
};

fn validate(form: &SabaqForm) -> AppResult<()> {
	if !(1..=114).contains(&form.chapter_number) {
		return Err(AppError::bad_request("Chapter number must be between 1 and 114"));
	}
	if !(1..=TOTAL_PAGES).contains(&form.page) {
		return Err(AppError::bad_request(format!("Page must be between 1 and {TOTAL_PAGES}")));
	}
	if !(1..=SECTIONS_PER_PAGE as i64).contains(&form.section) {
		return Err(AppError::bad_request(format!("Section must be between 1 and {SECTIONS_PER_PAGE}")));
	}
	if form.number_of_readings < 0 || form.murajaah_20_times < 0 {
		return Err(AppError::bad_request("Counters can't be negative"));
	}
	Ok(())
}

/// One row per day and verse range; a repeat submission only moves the counters.
pub async fn upsert(db: &DB, uid: Uid, today: NaiveDate, form: &SabaqForm) -> AppResult<ReviewOutcome> {
	validate(form)?;
	let mut tx = sql::begin_write(db).await?;

	let existing: Option<(i64,)> = sqlx::query_as(
		r#"
SELECT id FROM sabaq_tracker
WHERE user_id = ? AND date = ? AND chapter_number = ? AND chapter_name = ? AND page = ? AND section = ? AND verse = ?
		"#,
	)
	.bind(uid)
	.bind(today)
	.bind(form.chapter_number)
	.bind(&form.chapter_name)
	.bind(form.page)
	.bind(form.section)
	.bind(&form.verse)
	.fetch_optional(&mut *tx)
	.await?;

	let outcome = match existing {
		Some((id,)) => {
			sqlx::query(
				"UPDATE sabaq_tracker SET number_of_readings = ?, complete_memorization = ?, murajaah_20_times = ? WHERE id = ?",
			)
			.bind(form.number_of_readings)
			.bind(form.complete_memorization)
			.bind(form.murajaah_20_times)
			.bind(id)
			.execute(&mut *tx)
			.await?;
			ReviewOutcome::Updated
		}
		None => {
			sqlx::query(
				r#"
INSERT INTO sabaq_tracker
	(user_id, date, chapter_number, chapter_name, page, section, verse, number_of_readings, complete_memorization, murajaah_20_times)
VALUES
	(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
				"#,
			)
			.bind(uid)
			.bind(today)
			.bind(form.chapter_number)
			.bind(&form.chapter_name)
			.bind(form.page)
			.bind(form.section)
			.bind(&form.verse)
			.bind(form.number_of_readings)
			.bind(form.complete_memorization)
			.bind(form.murajaah_20_times)
			.execute(&mut *tx)
			.await?;
			ReviewOutcome::Inserted
		}
	};

	tx.commit().await?;
	debug!("sabaq for user {uid} on {today}: {outcome:?}");
	Ok(outcome)
}

pub async fn latest(db: &DB, uid: Uid) -> AppResult<Option<SabaqRecord>> {
	let row = sqlx::query_as::<_, SabaqRecord>(
		r#"
SELECT id, user_id, date, chapter_number, chapter_name, page, section, verse,
	number_of_readings, complete_memorization, murajaah_20_times
FROM sabaq_tracker
WHERE user_id = ?
ORDER BY id DESC
LIMIT 1
		"#,
	)
	.bind(uid)
	.fetch_optional(db)
	.await?;
	Ok(row)
}
