//! Demo that runs one intake session against the configured forecasting service.
//!
//! Usage: `intake_demo [arabica|excelsa|robusta]`, with the five file paths in
//! INTAKE_FILE_PRICE / INTAKE_FILE_VOLUME / INTAKE_FILE_INFLATION /
//! INTAKE_FILE_NET_RETURN / INTAKE_FILE_PRODUCTION_COST (a `.env` file works too).

use anyhow::Context;
use coffee_forecast_intake::{
    history_client, telemetry, CommodityType, FactorFile, FactorId, FactorStore, HistoryBrowser,
    IntakeController, IntakeError, MainFactorKind, ServiceConfig, SharedFactor,
};

const FILE_VARS: [(&str, FactorId); 5] = [
    ("INTAKE_FILE_PRICE", FactorId::Main(MainFactorKind::PriceSeries)),
    ("INTAKE_FILE_VOLUME", FactorId::Main(MainFactorKind::VolumeSeries)),
    ("INTAKE_FILE_INFLATION", FactorId::Shared(SharedFactor::InflationRate)),
    ("INTAKE_FILE_NET_RETURN", FactorId::Shared(SharedFactor::NetReturn)),
    ("INTAKE_FILE_PRODUCTION_COST", FactorId::Shared(SharedFactor::ProductionCost)),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let commodity: CommodityType = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "arabica".to_string())
        .parse()?;
    let cfg = ServiceConfig::load_default()?;
    let store = FactorStore::shared();
    let session = IntakeController::from_config(commodity, store, &cfg)?;

    for (var, id) in FILE_VARS {
        let Ok(path) = std::env::var(var) else {
            continue;
        };
        let file = FactorFile::from_path(&path)
            .await
            .with_context(|| format!("reading {var}={path}"))?;
        session.commit_upload(&id.label(commodity), file).await?;
    }

    match session.run_forecast().await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(outcome.response.as_value())?);
            let mut history = HistoryBrowser::new(history_client(&cfg)?, commodity);
            match history.refresh().await {
                Ok(view) => eprintln!("{} stored {commodity} forecast(s)", view.len()),
                Err(e) => eprintln!("history unavailable: {e}"),
            }
            Ok(())
        }
        Err(IntakeError::Validation(v)) => {
            eprintln!("cannot run forecast for {commodity}; missing:");
            for name in &v.missing {
                eprintln!("  - {name}");
            }
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
