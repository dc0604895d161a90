use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
	tracing_subscriber::registry()
		.with(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "murajaah_tracker=debug,tower_http=info,info".into()),
		)
		.with(fmt::layer().with_target(true).with_line_number(true))
		.init()
}
