use anyhow::Context;
use drive_time::config::{Config, REQUIRED_VARIABLES};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = load_config(|name| std::env::var(name).ok())?;

    config.log();

    let batch = drive_time::run_batch(&config).await?;
    batch.report.log();

    Ok(())
}

// Config errors carry the hint here and are logged once, by `main`
fn load_config<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    Config::from_lookup(lookup).with_context(|| {
        format!(
            "config: check all required environment variables ({}) are set",
            REQUIRED_VARIABLES.join(", ")
        )
    })
}
