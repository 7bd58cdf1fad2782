use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = procura_worker::Args::parse();

	procura_worker::run(args).await
}
