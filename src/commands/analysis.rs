use std::path::Path;

use tracing::{info, warn};

use crate::api::ImagePayload;
use crate::backend::Backend;
use crate::samples;
use crate::state::AppState;
use crate::store::StoredAnalysis;

/// Analyze an image file and store the result for the results view.
pub async fn analyze_image(
    state: &AppState,
    path: &Path,
    use_kmeans: bool,
    backend: Option<Backend>,
) -> Result<StoredAnalysis, String> {
    let image = ImagePayload::from_path(path)?;
    run_analysis(state, image, use_kmeans, backend).await
}

/// Analyze one of the bundled sample images.
pub async fn analyze_sample(
    state: &AppState,
    name: &str,
    use_kmeans: bool,
    backend: Option<Backend>,
) -> Result<StoredAnalysis, String> {
    let image = samples::load_sample(&state.settings().samples_dir, name)?;
    run_analysis(state, image, use_kmeans, backend).await
}

pub fn list_samples(all: bool) -> Vec<String> {
    if all {
        samples::all_samples()
    } else {
        samples::FEATURED_SAMPLES.iter().map(|s| s.to_string()).collect()
    }
}

async fn run_analysis(
    state: &AppState,
    image: ImagePayload,
    use_kmeans: bool,
    backend: Option<Backend>,
) -> Result<StoredAnalysis, String> {
    info!("Starting analysis of '{}'", image.file_name());

    // A new analysis replaces whatever the results view was showing.
    if let Err(e) = state.session().clear() {
        warn!("Failed to clear previous analysis: {}", e);
    }

    let result = state.client().detect(&image, use_kmeans, backend).await?;

    if let Some(message) = result.error.as_deref().filter(|m| !m.trim().is_empty()) {
        warn!("Backend reported an error for '{}': {}", image.file_name(), message);
        return Err(format!("Analysis failed: {}", message));
    }

    let analysis = StoredAnalysis::new(result, image.file_name(), use_kmeans);
    state.session().save(&analysis)?;

    info!(
        "Analysis complete: detected {} nails with {} matches",
        analysis.result.metrics.nail_count().unwrap_or(0.0),
        analysis.result.metrics.match_count().unwrap_or(0.0)
    );
    Ok(analysis)
}
