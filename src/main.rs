#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

pub use chaos_engine::serve;
use tracing::info;

fn init_tracing() {
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env());
    fmt.json().init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let bind = std::env::var("CHAOS_BIND").unwrap_or_else(|_| "0.0.0.0:8003".to_string());
    info!(bind = %bind, "starting chaos engine");
    serve(&bind).await?;
    Ok(())
}
