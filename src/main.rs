use anyhow::Result;
use murajaah_tracker::{config::Config, logger, start_server};

#[tokio::main]
async fn main() -> Result<()> {
	// a missing .env is fine, the environment may already be set
	let dotenv = dotenvy::dotenv();
	logger::init();
	if let Err(e) = dotenv {
		tracing::debug!("no .env loaded: {e}");
	}

	let config = Config::load()?;
	start_server(config).await
}
