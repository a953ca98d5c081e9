use std::path::{Path, PathBuf};

use tracing::info;

use crate::api::client::artifact_file_name;
use crate::backend::Backend;
use crate::report::ImageUrls;
use crate::state::AppState;
use crate::store::StoredAnalysis;

/// The analysis stored by the last successful upload.
pub fn get_results(state: &AppState) -> Result<StoredAnalysis, String> {
    state
        .session()
        .load()?
        .ok_or_else(|| "No results found. Please upload an image first.".to_string())
}

pub fn result_image_urls(state: &AppState, backend: Option<Backend>) -> Result<ImageUrls, String> {
    let analysis = get_results(state)?;
    let client = state.client();
    Ok(ImageUrls {
        output_image: client.resolve_image_url(&analysis.result.output_image, backend),
        analysis_image: client.resolve_image_url(&analysis.result.analysis_image, backend),
    })
}

/// Download the results CSV of the stored analysis into `dest_dir`.
pub async fn download_results_csv(
    state: &AppState,
    dest_dir: &Path,
    backend: Option<Backend>,
) -> Result<PathBuf, String> {
    let analysis = get_results(state)?;
    let path = state
        .client()
        .download_artifact(&analysis.result.results_csv, dest_dir, backend)
        .await
        .map_err(|e| format!("Unable to download the CSV file: {}", e))?;
    info!("CSV downloaded to {:?}", path);
    Ok(path)
}

/// Save both rendered images of the stored analysis into `dest_dir`.
pub async fn save_result_images(
    state: &AppState,
    dest_dir: &Path,
    backend: Option<Backend>,
) -> Result<Vec<PathBuf>, String> {
    let analysis = get_results(state)?;
    let names = [&analysis.result.output_image, &analysis.result.analysis_image];
    let mut targets = Vec::with_capacity(names.len());
    for name in names {
        let file_name = artifact_file_name(name)?;
        let target = dest_dir.join(&file_name);
        if targets.contains(&target) {
            return Err(format!(
                "Both result images are named '{}', refusing to overwrite one with the other",
                file_name
            ));
        }
        targets.push(target);
    }

    let mut saved = Vec::new();
    for (name, target) in names.into_iter().zip(targets) {
        let bytes = state.client().fetch_image(name, backend).await?;
        crate::store::write_atomic(&target, &bytes)
            .map_err(|e| format!("Failed to save {:?}: {}", target, e))?;
        info!("Saved image to {:?}", target);
        saved.push(target);
    }
    Ok(saved)
}

/// Forget the stored analysis.
pub fn new_analysis(state: &AppState) -> Result<(), String> {
    state.session().clear()?;
    Ok(())
}
