use clap::Parser;

use courier::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = cli::load_settings(&cli)?;
    cli::init_logger_from_settings(&cli, &settings)?;

    let mut stdout = std::io::stdout().lock();
    cli::execute_command(&cli, &settings, &mut stdout).await?;

    Ok(())
}
