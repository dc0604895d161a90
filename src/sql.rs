use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};
use sqlx::{
	sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
	Sqlite, SqlitePool, Transaction,
};
use tracing::debug;

pub type DB = SqlitePool;

/// Opens the pool and makes sure every table exists.
///
/// `:memory:` gives a single, never-recycled connection so the database
/// outlives individual queries.
pub async fn open(url: &str, max_connections: u32) -> Result<DB> {
	let pool = if url == ":memory:" {
		SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
			.await
			.context("can't open in-memory database")?
	} else {
		let options = SqliteConnectOptions::from_str(url)?
			.create_if_missing(true)
			.journal_mode(SqliteJournalMode::Wal);

		SqlitePoolOptions::new()
			.max_connections(max_connections)
			.acquire_timeout(Duration::from_secs(3))
			.connect_with(options)
			.await
			.with_context(|| format!("can't connect to database at {url}"))?
	};

	schema(&pool).await?;
	Ok(pool)
}

pub async fn schema(db: &DB) -> Result<()> {
	for statement in TABLE_SCHEMA {
		sqlx::query(statement)
			.execute(db)
			.await
			.with_context(|| format!("failed to apply schema statement: {statement}"))?;
	}
	debug!("schema ready ({} statements)", TABLE_SCHEMA.len());
	Ok(())
}

/// A transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before it writes fails with `SQLITE_BUSY`
/// once another writer commits in between. Locking first makes concurrent
/// writers queue on the busy timeout instead.
pub async fn begin_write(db: &DB) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
	let mut tx = db.begin().await?;
	// matches no rows but still takes the RESERVED lock
	sqlx::query("UPDATE users SET name = name WHERE 0").execute(&mut *tx).await?;
	Ok(tx)
}

pub const TABLE_SCHEMA: &[&str] = &[
	r#"
CREATE TABLE IF NOT EXISTS users (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL UNIQUE,
	pin TEXT NOT NULL
)"#,
	r#"
CREATE TABLE IF NOT EXISTS memorized_surah (
	user_id INTEGER NOT NULL,
	id REAL NOT NULL,
	parent_id REAL DEFAULT NULL,
	chapter_name TEXT NOT NULL,
	total_verse INTEGER NOT NULL,
	verse_memorized INTEGER NOT NULL DEFAULT 0,
	juz INTEGER NOT NULL,
	note TEXT DEFAULT NULL,
	murajaah_counter INTEGER NOT NULL DEFAULT 0,
	PRIMARY KEY(user_id, id),
	CHECK(verse_memorized >= 0 AND verse_memorized <= total_verse),
	CHECK(juz BETWEEN 1 AND 30),
	CHECK(parent_id IS NULL OR parent_id != id),
	FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
	FOREIGN KEY(user_id, parent_id) REFERENCES memorized_surah(user_id, id) ON DELETE CASCADE
)"#,
	r#"
CREATE TABLE IF NOT EXISTS murajaah_log (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	user_id INTEGER NOT NULL,
	log_date DATE NOT NULL,
	date_time TEXT NOT NULL,
	completion_rate REAL NOT NULL DEFAULT 0,
	UNIQUE(user_id, log_date),
	FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
)"#,
	r#"
CREATE TABLE IF NOT EXISTS murajaah_log_surah (
	log_id INTEGER NOT NULL,
	surah_id REAL NOT NULL,
	UNIQUE(log_id, surah_id),
	FOREIGN KEY(log_id) REFERENCES murajaah_log(id) ON DELETE CASCADE
)"#,
	r#"
CREATE TABLE IF NOT EXISTS sabaq_tracker (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	user_id INTEGER NOT NULL,
	date DATE NOT NULL,
	chapter_number INTEGER NOT NULL,
	chapter_name TEXT NOT NULL,
	page INTEGER NOT NULL,
	section INTEGER NOT NULL,
	verse TEXT NOT NULL,
	number_of_readings INTEGER NOT NULL DEFAULT 0,
	complete_memorization BOOL NOT NULL DEFAULT false,
	murajaah_20_times INTEGER NOT NULL DEFAULT 0,
	UNIQUE(user_id, date, chapter_number, chapter_name, page, section, verse),
	FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
)"#,
	r#"
CREATE TABLE IF NOT EXISTS tahajjud_tracker (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	user_id INTEGER NOT NULL,
	streak_count INTEGER NOT NULL DEFAULT 1,
	FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
)"#,
	r#"
CREATE TABLE IF NOT EXISTS tahajjud_night (
	tracker_id INTEGER NOT NULL,
	night DATE NOT NULL,
	UNIQUE(tracker_id, night),
	FOREIGN KEY(tracker_id) REFERENCES tahajjud_tracker(id) ON DELETE CASCADE
)"#,
	r#"
CREATE TABLE IF NOT EXISTS tilawah_tracker (
	user_id INTEGER NOT NULL PRIMARY KEY,
	last_page_recited INTEGER NOT NULL DEFAULT 1,
	last_update_date DATE NOT NULL,
	last_update_time TEXT NOT NULL,
	CHECK(last_page_recited BETWEEN 1 AND 604),
	FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
)"#,
	r#"
CREATE TABLE IF NOT EXISTS tilawah_update_log (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	user_id INTEGER NOT NULL,
	page_number INTEGER NOT NULL,
	update_date DATE NOT NULL,
	update_time TEXT NOT NULL,
	notes TEXT DEFAULT NULL,
	FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
)"#,
	r#"
CREATE TABLE IF NOT EXISTS khatam_goal (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	user_id INTEGER NOT NULL UNIQUE,
	goal_type TEXT NOT NULL CHECK(goal_type IN ('once_month', 'once_two_months', 'free')),
	target_completion_date DATE DEFAULT NULL,
	created_at TEXT NOT NULL,
	updated_at TEXT NOT NULL,
	FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
)"#,
	"CREATE INDEX IF NOT EXISTS tahajjud_night_by_date ON tahajjud_night(night)",
	"CREATE INDEX IF NOT EXISTS tilawah_log_by_user ON tilawah_update_log(user_id, update_time)",
];
