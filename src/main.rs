//! cropcast CLI.
//!
//! Interactive front end for the two prediction app variants: pick a target
//! and the climate parameters, get the predicted yield change.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

use cropcast::forms::commodity::{
    BlsCode, Co2Effects, CommodityAdaptation, CommodityGroup, CommodityInputs, CommoditySession,
    Scenario,
};
use cropcast::forms::crop::{Adaptation, ClimateModel, Crop, CropInputs, CropSession, Region};
use cropcast::registry::ArtifactStore;
use cropcast::YieldDirection;

/// Crop yield change prediction from climate scenarios.
#[derive(Parser, Debug)]
#[command(name = "cropcast")]
#[command(version)]
#[command(about = "Predict crop yield change under climate scenarios", long_about = None)]
struct Cli {
    /// Directory holding the model artifacts
    #[arg(long, global = true, default_value = "models")]
    models_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict yield change for a single crop (ordinal-coded inputs)
    Crop {
        /// Crop type
        #[arg(long, value_enum)]
        crop: Crop,

        /// Climate model
        #[arg(long, value_enum)]
        climate_model: ClimateModel,

        /// CO2 ppm level
        #[arg(long, value_parser = clap::value_parser!(u16).range(300..=600))]
        co2: u16,

        /// Adaptation level
        #[arg(long, value_enum)]
        adaptation: Adaptation,

        /// Region
        #[arg(long, value_enum)]
        region: Region,
    },

    /// Predict yield change for a commodity group (preprocessor inputs)
    Commodity {
        /// Commodity group
        #[arg(long, value_enum)]
        group: CommodityGroup,

        /// BLS site code
        #[arg(long, value_enum)]
        bls_code: BlsCode,

        /// Climate scenario
        #[arg(long, value_enum)]
        scenario: Scenario,

        /// Time slice (year)
        #[arg(long)]
        time_slice: f32,

        /// CO2 effects option
        #[arg(long, value_enum)]
        co2_effects: Co2Effects,

        /// CO2 ppm level
        #[arg(long)]
        co2_ppm: f32,

        /// Adaptation level
        #[arg(long, value_enum)]
        adaptation: CommodityAdaptation,
    },

    /// Show which model artifacts are available
    Status,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = ArtifactStore::new(cli.models_dir);

    match cli.command {
        Commands::Crop {
            crop,
            climate_model,
            co2,
            adaptation,
            region,
        } => {
            let mut session = CropSession::new(store);
            let inputs = CropInputs {
                climate_model,
                co2: f32::from(co2),
                adaptation,
                region,
            };
            let prediction = session.predict(crop, &inputs)?;
            report(prediction.direction(), &prediction.to_string());
        }

        Commands::Commodity {
            group,
            bls_code,
            scenario,
            time_slice,
            co2_effects,
            co2_ppm,
            adaptation,
        } => {
            let mut session = CommoditySession::open(store);
            let inputs = CommodityInputs {
                bls_code,
                scenario,
                time_slice,
                co2_effects,
                co2_ppm,
                adaptation,
            };
            let prediction = session.predict(group, &inputs)?;
            report(prediction.direction(), &prediction.to_string());
        }

        Commands::Status => {
            print_status(store);
        }
    }

    Ok(())
}

fn report(direction: YieldDirection, formatted: &str) {
    match direction {
        YieldDirection::Increase => println!("Predicted yield increase: {formatted}"),
        YieldDirection::Decrease => println!("Predicted yield decrease: {formatted}"),
    }
}

fn print_status(store: ArtifactStore) {
    println!("Models directory: {}", store.root().display());

    println!("\nCrops:");
    let mut crops = CropSession::new(store.clone());
    for target in Crop::ALL {
        let state = if crops.available(target) { "ok" } else { "unavailable" };
        println!("  {:<14} {}", target.as_str(), state);
    }

    println!("\nCommodity groups:");
    let mut commodities = CommoditySession::open(store);
    match commodities.preprocessor() {
        Ok(_) => println!("  {:<14} ok", "preprocessor"),
        Err(err) => println!("  {:<14} unavailable ({err})", "preprocessor"),
    }
    for target in CommodityGroup::ALL {
        let state = if commodities.available(target) { "ok" } else { "unavailable" };
        println!("  {:<14} {}", target.as_str(), state);
    }
}
