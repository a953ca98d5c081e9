use tracing::info;

use crate::api::EvaluationResult;
use crate::backend::Backend;
use crate::state::AppState;

pub async fn run_evaluation(
    state: &AppState,
    test_dir: &str,
    backend: Option<Backend>,
) -> Result<EvaluationResult, String> {
    let test_dir = test_dir.trim();
    if test_dir.is_empty() {
        return Err("Test directory cannot be empty.".to_string());
    }

    let result = state.client().evaluate(test_dir, backend).await?;
    info!(
        "Evaluation of '{}' returned {} metrics",
        test_dir,
        result.metrics.len()
    );
    Ok(result)
}
