use engine::{Currency, Engine};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendwise={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let mut builder = Engine::builder();
    if let Some(code) = settings.server.currency.as_deref() {
        let currency = Currency::try_from(code)?;
        tracing::info!("default group currency: {}", currency.code());
        builder = builder.default_currency(currency);
    }
    let engine = builder.build();

    let addr = settings.address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return Err(err.into());
        }
    };

    server::run_with_listener(engine, listener).await?;
    Ok(())
}
