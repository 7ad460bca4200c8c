//! Example: Full Gap-Filling Pipeline
//!
//! This example runs the complete gapfill workflow on a synthetic
//! half-hourly flux tower record:
//! 1. Generating 30 days of radiation, temperature, vapour pressure deficit
//!    and net ecosystem exchange with gaps
//! 2. Adding lag and timestamp features
//! 3. Reducing features against a random control
//! 4. Training a random forest and filling the gaps
//! 5. Printing importances, scores and the gap-filled series
//!
//! Run with: `RUST_LOG=gapfill=debug cargo run --example full_pipeline --features full`

use chrono::{Duration, NaiveDate, Timelike};
use gapfill::{
    features::{FeatureBuilder, FeatureConfig},
    model::{ForestConfig, MaxFeatures, RandomForestRegressor},
    pipeline::{PipelineConfig, TimeSeriesGapFiller},
    primitives::{Flag, ImportanceTable, TimeSeriesDataset},
};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Number of half-hourly records (30 days)
const RECORDS: usize = 48 * 30;

/// Seed of the synthetic data
const DATA_SEED: u64 = 7;

/// Sensor outages: (first record, length) with all meteorology missing
const SENSOR_OUTAGES: &[(usize, usize)] = &[(300, 6), (900, 12)];

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gapfill=info".into()),
        )
        .init();

    // Step 1: Synthetic record
    let dataset = synthetic_flux_record()?;
    println!(
        "Input: {} records, {} missing NEE values\n",
        dataset.len(),
        dataset.target()?.iter().filter(|v| v.is_none()).count()
    );

    // Step 2: Feature engineering
    let features = FeatureBuilder::with_config(FeatureConfig {
        lags: vec![-2, -1, 1, 2],
        include_timestamp_features: true,
        include_record_number: false,
    });
    let forest = ForestConfig {
        n_estimators: 50,
        max_depth: Some(12),
        max_features: MaxFeatures::Sqrt,
        ..ForestConfig::default()
    };
    let mut filler = TimeSeriesGapFiller::<RandomForestRegressor>::with_features(
        &dataset,
        &features,
        forest,
        PipelineConfig::default(),
    )?;
    println!("Candidate features: {}\n", filler.dataset().feature_names().join(", "));

    // Step 3: Feature reduction
    let reduction = filler.reduce_features()?;
    print_importances("Feature reduction", &reduction.importances, Some(reduction.threshold));
    println!("Accepted: {}", reduction.accepted.join(", "));
    println!("Rejected: {}\n", reduction.rejected.join(", "));
    if reduction.is_degenerate() {
        println!("No feature beat the random control; nothing to train on.");
        return Ok(());
    }

    // Step 4: Training and gap filling
    let trained = filler.train_model()?;
    let details = &trained.details;
    println!(
        "Trained on {} of {} complete records ({} held out), {} to {}",
        details.n_train, details.n_observed, details.n_test, details.first_timestamp, details.last_timestamp
    );
    println!("Test scores: {:?}\n", trained.scores_test);
    print_importances("Test set", &trained.importances_test, None);

    let outcome = filler.fill_gaps()?;
    if let (Some(importances), Some(scores)) = (&outcome.importances, &outcome.scores) {
        print_importances("Full set", importances, None);
        println!("Full-set R²: {:.4}\n", scores.r2);
    }

    // Step 5: Results
    let result = &outcome.result;
    println!("Flags:");
    for flag in [Flag::Observed, Flag::FullModel, Flag::Fallback] {
        println!("  {:<10} {:>6}", format!("{flag:?}"), result.count_flag(flag));
    }
    println!("  {:<10} {:>6}\n", "Unfilled", result.n_unfilled());
    if !result.fallback_features().is_empty() {
        println!("Fallback features: {}\n", result.fallback_features().join(", "));
    }

    let frame = result.to_frame()?;
    let (start, _) = SENSOR_OUTAGES[1];
    println!("Records around the second sensor outage:");
    println!("{}", frame.slice(start as i64 - 2, 16));

    Ok(())
}

// ============================================================================
// SYNTHETIC DATA
// ============================================================================

/// Half-hourly record with a diurnal radiation cycle, random target gaps and
/// sensor outages.
fn synthetic_flux_record() -> Result<TimeSeriesDataset, Box<dyn std::error::Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(DATA_SEED);
    let noise: Normal<f64> = Normal::new(0.0, 1.0)?;
    let start = NaiveDate::from_ymd_opt(2023, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or("invalid start date")?;

    let timestamps: Vec<_> = (0..RECORDS).map(|i| start + Duration::minutes(30 * i as i64)).collect();

    let mut rg = Vec::with_capacity(RECORDS);
    let mut ta = Vec::with_capacity(RECORDS);
    let mut vpd = Vec::with_capacity(RECORDS);
    let mut nee = Vec::with_capacity(RECORDS);
    for (i, t) in timestamps.iter().enumerate() {
        let hour = t.hour() as f64 + t.minute() as f64 / 60.0;
        let day = i as f64 / 48.0;
        let sun = ((hour - 6.0) / 12.0 * std::f64::consts::PI).sin().max(0.0);
        let cloud = 0.7 + 0.3 * (day / 3.0).sin();

        let radiation = 850.0 * sun * cloud + 5.0 * noise.sample(&mut rng).abs();
        let temperature = 14.0 + 7.0 * ((hour - 9.0) / 24.0 * 2.0 * std::f64::consts::PI).sin()
            + 0.2 * day
            + 0.5 * noise.sample(&mut rng);
        let deficit = (0.1 * (temperature - 8.0)).max(0.0) + 0.05 * noise.sample(&mut rng);
        let exchange = 2.0 + 0.12 * temperature - 0.025 * radiation / (1.0 + 0.3 * deficit)
            + 0.8 * noise.sample(&mut rng);

        rg.push(Some(radiation));
        ta.push(Some(temperature));
        vpd.push(Some(deficit));
        // Quality filtering removes about 15% of the fluxes
        nee.push((rng.r#gen::<f64>() > 0.15).then_some(exchange));
    }

    for &(first, length) in SENSOR_OUTAGES {
        for i in first..first + length {
            rg[i] = None;
            ta[i] = None;
            vpd[i] = None;
            nee[i] = None;
        }
    }

    let frame = df! {
        "NEE" => nee,
        "Rg" => rg,
        "TA" => ta,
        "VPD" => vpd,
    }?;
    Ok(TimeSeriesDataset::new(timestamps, frame, "NEE")?)
}

// ============================================================================
// OUTPUT FORMATTING
// ============================================================================

fn print_importances(title: &str, table: &ImportanceTable, threshold: Option<f64>) {
    println!("{title} importances:");
    println!("  {:<16} {:>10} {:>10}", "Feature", "Mean", "Std");
    for entry in table.iter() {
        let marker = match threshold {
            Some(t) if entry.mean > t => "*",
            _ => "",
        };
        println!("  {:<16} {:>10.4} {:>10.4} {marker}", entry.feature, entry.mean, entry.std);
    }
    if let Some(t) = threshold {
        println!("  threshold {t:.4}");
    }
    println!();
}
