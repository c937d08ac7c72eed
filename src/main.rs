//! difz - MACD DIF z-score momentum backtester

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (DIFZ_MACD_FILE / DIFZ_PRICE_FILE overrides)
    dotenvy::dotenv().ok();

    let app = difz::adapters::cli::init();
    difz::adapters::cli::execute(app).await
}
