use anyhow::Context;
use clap::Parser;
use onboarding_ocr::certificate::AccreditedInstitutions;
use onboarding_ocr::config::{Args, Config};
use onboarding_ocr::server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::try_from(args)?;

    let accredited = match &config.accredited_institutions {
        Some(path) => AccreditedInstitutions::from_file(path)
            .with_context(|| format!("Failed to read accredited institutions from {:?}", path))?,
        None => AccreditedInstitutions::default(),
    };

    tracing::info!(
        "Starting onboarding-ocr-server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        "Engine: {}, {} accredited institutions, century cutoff: {}",
        config.engine.name(),
        accredited.len(),
        config.century_rule.cutoff()
    );
    tracing::info!("Binding to {}:{}", config.host, config.port);

    server::run(config, accredited).await
}
