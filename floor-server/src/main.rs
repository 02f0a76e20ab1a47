use floor_server::{Server, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv, work dir, logging
    let config = setup_environment()?;

    print_banner();
    tracing::info!(
        work_dir = %config.work_dir,
        port = config.http_port,
        timezone = %config.timezone,
        release_point = %config.table_release_point,
        production = config.is_production(),
        "Floor server starting..."
    );

    // 2. state, background tasks, HTTP until ctrl-c
    if let Err(e) = Server::new(config).run().await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    Ok(())
}
