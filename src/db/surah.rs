use tracing::debug;

use crate::{
	error::{AppError, AppResult},
	sql::DB,
	types::{MemorizedSurah, SurahForm, SurahId, Uid},
};

const SURAH_COLUMNS: &str = "id, parent_id, chapter_name, total_verse, verse_memorized, juz, note, murajaah_counter, user_id";

fn validate(form: &SurahForm) -> AppResult<()> {
	if form.chapter_name.trim().is_empty() {
		return Err(AppError::bad_request("Chapter name is required"));
	}
	if !(1..=30).contains(&form.juz) {
		return Err(AppError::bad_request("Juz must be between 1 and 30"));
	}
	if form.total_verse < 1 {
		return Err(AppError::bad_request("Total verse must be positive"));
	}
	if form.verse_memorized < 0 || form.verse_memorized > form.total_verse {
		return Err(AppError::bad_request("Verse memorized must be between 0 and total verse"));
	}
	Ok(())
}

pub async fn list(db: &DB, uid: Uid) -> AppResult<Vec<MemorizedSurah>> {
	let rows = sqlx::query_as::<_, MemorizedSurah>(&format!(
		"SELECT {SURAH_COLUMNS} FROM memorized_surah WHERE user_id = ? ORDER BY juz ASC, id ASC"
	))
	.bind(uid)
	.fetch_all(db)
	.await?;

	debug!("user {uid} has {} memorized surahs", rows.len());
	Ok(rows)
}

/// Least-reviewed surahs first, skipping entries with nothing memorized yet.
pub async fn highlighted(db: &DB, uid: Uid) -> AppResult<Vec<MemorizedSurah>> {
	let rows = sqlx::query_as::<_, MemorizedSurah>(&format!(
		"SELECT {SURAH_COLUMNS} FROM memorized_surah
		WHERE user_id = ? AND verse_memorized > 0
		ORDER BY murajaah_counter ASC, id ASC"
	))
	.bind(uid)
	.fetch_all(db)
	.await?;
	Ok(rows)
}

pub async fn get(db: &DB, uid: Uid, id: SurahId) -> AppResult<Option<MemorizedSurah>> {
	let row = sqlx::query_as::<_, MemorizedSurah>(&format!(
		"SELECT {SURAH_COLUMNS} FROM memorized_surah WHERE user_id = ? AND id = ?"
	))
	.bind(uid)
	.bind(id)
	.fetch_optional(db)
	.await?;
	Ok(row)
}

async fn check_parent(db: &DB, uid: Uid, id: SurahId, parent_id: Option<SurahId>) -> AppResult<()> {
	let Some(parent_id) = parent_id else {
		return Ok(());
	};
	if parent_id == id {
		return Err(AppError::bad_request("A surah can't be its own parent"));
	}
	let parent = get(db, uid, parent_id)
		.await?
		.ok_or_else(|| AppError::bad_request(format!("Parent surah {parent_id} not found")))?;

	// walk up so `id` never ends up below itself
	let mut next = parent.parent_id;
	while let Some(ancestor) = next {
		if ancestor == id {
			return Err(AppError::bad_request(format!("Surah {parent_id} is a sub-section of {id}")));
		}
		next = get(db, uid, ancestor).await?.and_then(|surah| surah.parent_id);
	}
	Ok(())
}

pub async fn insert(db: &DB, uid: Uid, form: &SurahForm) -> AppResult<()> {
	let id = form.id.ok_or_else(|| AppError::bad_request("Surah id is required"))?;
	validate(form)?;

	if get(db, uid, id).await?.is_some() {
		return Err(AppError::Conflict(format!("Surah {id} already exists")));
	}
	check_parent(db, uid, id, form.parent_id).await?;

	sqlx::query(
		r#"
INSERT INTO memorized_surah
	(user_id, id, parent_id, chapter_name, total_verse, verse_memorized, juz, note)
VALUES
	(?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(uid)
	.bind(id)
	.bind(form.parent_id)
	.bind(form.chapter_name.trim())
	.bind(form.total_verse)
	.bind(form.verse_memorized)
	.bind(form.juz)
	.bind(&form.note)
	.execute(db)
	.await?;

	debug!("user {uid} added surah {id}");
	Ok(())
}

pub async fn update(db: &DB, uid: Uid, id: SurahId, form: &SurahForm) -> AppResult<()> {
	validate(form)?;
	check_parent(db, uid, id, form.parent_id).await?;

	let result = sqlx::query(
		r#"
UPDATE memorized_surah SET
	parent_id = ?, chapter_name = ?, total_verse = ?, verse_memorized = ?, juz = ?, note = ?
WHERE
	user_id = ? AND id = ?
		"#,
	)
	.bind(form.parent_id)
	.bind(form.chapter_name.trim())
	.bind(form.total_verse)
	.bind(form.verse_memorized)
	.bind(form.juz)
	.bind(&form.note)
	.bind(uid)
	.bind(id)
	.execute(db)
	.await?;

	if result.rows_affected() == 0 {
		return Err(AppError::not_found("Surah Not Found"));
	}
	Ok(())
}

/// Deletes a surah; its sub-sections cascade with it.
pub async fn delete(db: &DB, uid: Uid, id: SurahId) -> AppResult<()> {
	let result = sqlx::query("DELETE FROM memorized_surah WHERE user_id = ? AND id = ?")
		.bind(uid)
		.bind(id)
		.execute(db)
		.await?;

	if result.rows_affected() == 0 {
		return Err(AppError::not_found("Surah Not Found"));
	}
	debug!("user {uid} deleted surah {id}");
	Ok(())
}
