use clap::Parser;
use todolist_server::cli::Cli;
use todolist_server::TodoServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().resolve_config()?;

    let log_dir = config
        .log_dir
        .as_ref()
        .map(|dir| dir.to_string_lossy().into_owned());
    todolist_core::init_logging(&config.log_level, log_dir.as_deref())
        .map_err(anyhow::Error::msg)?;

    TodoServer::new(config)?.serve().await?;
    Ok(())
}
