//! Murajaah tracker: a personal Quran memorization and review API.
//!
//! Everything is scoped to the user named by the `x-user-id` header.
//! Users sign up through `POST /users/register`.
//!
//! - `/murajaah` memorized surah registry, daily review log with completion
//!   rates, sabaq (new memorization) tracker and tahajjud streaks.
//! - `/tilawah` page-by-page recitation progress and khatam goals.
//!
//! # Configuration
//!
//! Read from the environment (a `.env` file is honoured):
//! `DATABASE_URL`, `PORT`, `DB_MAX_CONNECTIONS`, `UTC_OFFSET_HOURS`,
//! `ALLOWED_ORIGINS`. Logging follows `RUST_LOG`.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
	http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
	Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};
use tracing::{info, warn};

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod khatam;
pub mod logger;
pub mod routes;
pub mod sections;
pub mod sql;
pub mod time;
pub mod types;
pub mod user;

use config::Config;

pub struct ServerState {
	pub db: sql::DB,
	pub config: Config,
}

pub type SharedState = Arc<ServerState>;

pub fn new_shared_state(db: sql::DB, config: Config) -> SharedState {
	Arc::new(ServerState { db, config })
}

fn cors(config: &Config) -> CorsLayer {
	let origins: Vec<HeaderValue> = config
		.allowed_origins
		.iter()
		.filter_map(|origin| match origin.parse() {
			Ok(value) => Some(value),
			Err(_) => {
				warn!("ignoring invalid origin {origin:?}");
				None
			}
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
		.allow_headers([CONTENT_TYPE, HeaderName::from_static(user::USER_HEADER)])
		.allow_credentials(true)
		.max_age(Duration::from_secs(60 * 60))
}

pub fn app(state: SharedState) -> Router {
	Router::new()
		.nest("/murajaah", routes::murajaah::router())
		.nest("/tilawah", routes::tilawah::router())
		.nest("/users", routes::users::router())
		.layer(TraceLayer::new_for_http())
		.layer(cors(&state.config))
		.with_state(state)
}

pub async fn start_server(config: Config) -> Result<()> {
	info!("Opening database...");
	let db = sql::open(&config.database_url, config.max_connections).await?;

	let address = format!("0.0.0.0:{}", config.port);
	let state = new_shared_state(db, config);

	let listener = TcpListener::bind(&address)
		.await
		.with_context(|| format!("can't bind {address}"))?;
	info!("Server running on {address}");

	axum::serve(listener, app(state))
		.with_graceful_shutdown(shutdown_signal())
		.await
		.context("server error")?;

	info!("Server shut down");
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			warn!("failed to listen for Ctrl+C: {e}");
			std::future::pending::<()>().await;
		}
		info!("Received Ctrl+C, shutting down");
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
				info!("Received terminate signal, shutting down");
			}
			Err(e) => {
				warn!("failed to install SIGTERM handler: {e}");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
