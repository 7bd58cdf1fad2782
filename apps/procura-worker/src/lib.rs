pub mod worker;

use std::path::PathBuf;

use clap::Parser;
use time::Date;
use tracing_subscriber::EnvFilter;

use procura_service::ProcuraService;
use procura_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = procura_cli::VERSION,
	rename_all = "kebab",
	styles = procura_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Run a single classification pass and exit.
	#[arg(long)]
	pub once: bool,
	/// Classify against this date instead of the current UTC date.
	#[arg(long, value_name = "YYYY-MM-DD", value_parser = procura_cli::parse_date)]
	pub today: Option<Date>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = procura_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let interval = config.lifecycle.run_interval_seconds;
	let service = ProcuraService::with_postgres(config, db);
	let schedule =
		worker::Schedule { once: args.once, today: args.today, interval_seconds: interval };

	worker::run_worker(&service, schedule).await
}
