use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::backend::Backend;
use crate::commands::{analysis, backend, evaluation, results};
use crate::config::Settings;
use crate::report;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "nailedit")]
#[command(about = "Detect, measure and match nails in images using the NailedIT service")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the active backend, or switch to `primary` / `secondary`
    Backend {
        #[arg(value_name = "BACKEND")]
        target: Option<Backend>,
    },
    /// Analyze an image file or a bundled sample
    Detect {
        /// Path to the image to analyze
        #[arg(value_name = "IMAGE", required_unless_present = "sample")]
        image_path: Option<PathBuf>,

        /// Analyze a bundled sample image instead of a file
        #[arg(long, value_name = "NAME", conflicts_with = "image_path")]
        sample: Option<String>,

        /// Use K-means clustering for matching
        #[arg(long)]
        kmeans: bool,

        /// Send to this backend only, without failover
        #[arg(long, value_name = "BACKEND")]
        backend: Option<Backend>,
    },
    /// Print the results of the last analysis
    Results {
        #[arg(long, value_name = "BACKEND")]
        backend: Option<Backend>,
    },
    /// Download the results CSV of the last analysis
    Download {
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        #[arg(long, value_name = "BACKEND")]
        backend: Option<Backend>,
    },
    /// Save the rendered images of the last analysis
    Images {
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        #[arg(long, value_name = "BACKEND")]
        backend: Option<Backend>,
    },
    /// Print the URL of a backend image
    ImageUrl {
        #[arg(value_name = "NAME")]
        name: String,

        #[arg(long, value_name = "BACKEND")]
        backend: Option<Backend>,
    },
    /// Discard the last analysis
    New,
    /// Evaluate the model against a test directory on the backend
    Evaluate {
        #[arg(value_name = "TEST_DIR")]
        test_dir: String,

        #[arg(long, value_name = "BACKEND")]
        backend: Option<Backend>,
    },
    /// List bundled sample images
    Samples {
        /// Include the full numbered range
        #[arg(long)]
        all: bool,
    },
}

pub async fn execute(cli: Cli) -> Result<()> {
    let settings = Settings::load()?;
    let state = AppState::initialize(settings)?;

    match cli.command {
        Command::Backend { target } => {
            let info = match target {
                Some(target) => backend::switch_backend(&state, target == Backend::Secondary),
                None => backend::get_backend(&state),
            };
            println!("Using {} backend: {}", info.backend, info.url);
        }
        Command::Detect {
            image_path,
            sample,
            kmeans,
            backend,
        } => {
            let analysis = match (image_path, sample) {
                (_, Some(name)) => analysis::analyze_sample(&state, &name, kmeans, backend).await,
                (Some(path), None) => analysis::analyze_image(&state, &path, kmeans, backend).await,
                (None, None) => Err("Please select an image file to analyze".to_string()),
            }
            .map_err(|e| anyhow!(e))?;

            println!(
                "Analysis complete! Detected {} nails with {} matches",
                analysis.result.metrics.nail_count().unwrap_or(0.0),
                analysis.result.metrics.match_count().unwrap_or(0.0)
            );
        }
        Command::Results { backend } => {
            let analysis = results::get_results(&state).map_err(|e| anyhow!(e))?;
            let urls = results::result_image_urls(&state, backend).map_err(|e| anyhow!(e))?;
            print!("{}", report::render_summary(&analysis, &urls));
        }
        Command::Download { out, backend } => {
            let path = results::download_results_csv(&state, &out, backend)
                .await
                .map_err(|e| anyhow!(e))?;
            println!("Saved {}", path.display());
        }
        Command::Images { out, backend } => {
            let paths = results::save_result_images(&state, &out, backend)
                .await
                .map_err(|e| anyhow!(e))?;
            for path in paths {
                println!("Saved {}", path.display());
            }
        }
        Command::ImageUrl { name, backend } => {
            println!("{}", state.client().resolve_image_url(&name, backend));
        }
        Command::New => {
            results::new_analysis(&state).map_err(|e| anyhow!(e))?;
            println!("Ready for a new analysis");
        }
        Command::Evaluate { test_dir, backend } => {
            let result = evaluation::run_evaluation(&state, &test_dir, backend)
                .await
                .map_err(|e| anyhow!(e))?;
            for (key, value) in &result.metrics {
                println!("{:<24} {}", key, value);
            }
            println!(
                "Evaluation image: {}",
                state
                    .client()
                    .resolve_image_url(&result.evaluation_results_image, backend)
            );
        }
        Command::Samples { all } => {
            for name in analysis::list_samples(all) {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
