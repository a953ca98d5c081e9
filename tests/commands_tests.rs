use std::path::PathBuf;

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tempfile::TempDir;

use nailedit::backend::Backend;
use nailedit::commands::{analysis, backend, evaluation, results};
use nailedit::config::{AppPaths, ConfigFile, Settings};
use nailedit::AppState;

struct Harness {
    dir: TempDir,
    primary: ServerGuard,
    secondary: ServerGuard,
}

impl Harness {
    async fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            primary: Server::new_async().await,
            secondary: Server::new_async().await,
        }
    }

    fn samples_dir(&self) -> PathBuf {
        self.dir.path().join("samples")
    }

    fn state(&self) -> AppState {
        self.state_with(&self.primary.url(), &self.secondary.url())
    }

    /// Same storage directories, different backends.
    fn state_with(&self, primary: &str, secondary: &str) -> AppState {
        let paths = AppPaths::in_dir(self.dir.path());
        let file = ConfigFile {
            primary_url: Some(primary.to_string()),
            secondary_url: Some(secondary.to_string()),
            request_timeout_secs: Some(10),
            samples_dir: Some(self.samples_dir()),
        };
        let settings = Settings::resolve(&paths, file, |_| None).unwrap();
        AppState::initialize(settings).unwrap()
    }

    fn write_image(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, b"GIF89a-upload").unwrap();
        path
    }
}

fn detection_body() -> String {
    json!({
        "metrics": {
            "nails_detected": 5,
            "matches_found": 2,
            "detection_score": 0.9,
            "match_precision": 0.8,
            "match_recall": 0.7
        },
        "output_image": "/api/images/out.png",
        "analysis_image": "analysis.png",
        "results_csv": "/api/files/results.csv",
        "nail_details": [
            {"x1": 1, "y1": 2, "x2": 30, "y2": 90,
             "confidence": 0.9, "height_mm": 50.0, "weight_g": 2.0}
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_analyze_stores_results_for_results_view() {
    let mut h = Harness::new().await;
    let mock = h
        .primary
        .mock("POST", "/api/detect")
        .match_body(Matcher::Regex(r#"name="use_kmeans"\r\n\r\ntrue"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(detection_body())
        .expect(1)
        .create_async()
        .await;

    let state = h.state();
    let image = h.write_image("bench.gif");
    let stored = analysis::analyze_image(&state, &image, true, None)
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(stored.file_name, "bench.gif");
    assert!(stored.use_kmeans);

    let loaded = results::get_results(&state).unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(loaded.result.metrics.nail_count(), Some(5.0));
    assert_eq!(loaded.result.nail_details.as_ref().map(Vec::len), Some(1));

    let urls = results::result_image_urls(&state, None).unwrap();
    assert_eq!(
        urls.output_image,
        format!("{}/api/images/out.png", h.primary.url())
    );
    assert_eq!(
        urls.analysis_image,
        format!("{}/api/images/analysis.png", h.primary.url())
    );
}

#[tokio::test]
async fn test_non_image_is_rejected_before_any_request() {
    let mut h = Harness::new().await;
    let primary_mock = h
        .primary
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let secondary_mock = h
        .secondary
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let state = h.state();
    let path = h.dir.path().join("notes.jpg");
    std::fs::write(&path, "this is not an image").unwrap();

    let err = analysis::analyze_image(&state, &path, false, None)
        .await
        .unwrap_err();

    primary_mock.assert_async().await;
    secondary_mock.assert_async().await;
    assert!(err.contains("not an image"), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_failed_analysis_clears_previous_results() {
    let mut h = Harness::new().await;
    let _ok = h
        .primary
        .mock("POST", "/api/detect")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(detection_body())
        .expect(1)
        .create_async()
        .await;

    let state = h.state();
    let image = h.write_image("first.gif");
    analysis::analyze_image(&state, &image, false, None)
        .await
        .unwrap();
    assert!(results::get_results(&state).is_ok());

    let mut primary_down = Server::new_async().await;
    let mut secondary_down = Server::new_async().await;
    let _primary_down = primary_down
        .mock("POST", "/api/detect")
        .with_status(500)
        .create_async()
        .await;
    let _secondary_down = secondary_down
        .mock("POST", "/api/detect")
        .with_status(500)
        .create_async()
        .await;
    let state = h.state_with(&primary_down.url(), &secondary_down.url());

    let err = analysis::analyze_image(&state, &image, false, None)
        .await
        .unwrap_err();
    assert_eq!(err, "Detection failed: Internal Server Error");

    let missing = results::get_results(&state).unwrap_err();
    assert!(missing.contains("No results found"));
}

#[tokio::test]
async fn test_backend_error_field_is_surfaced() {
    let mut h = Harness::new().await;
    let _mock = h
        .primary
        .mock("POST", "/api/detect")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "No nails found in image"}).to_string())
        .create_async()
        .await;

    let state = h.state();
    let image = h.write_image("empty.gif");
    let err = analysis::analyze_image(&state, &image, false, None)
        .await
        .unwrap_err();

    assert_eq!(err, "Analysis failed: No nails found in image");
    assert!(results::get_results(&state).is_err());
}

#[tokio::test]
async fn test_analyze_sample() {
    let mut h = Harness::new().await;
    let _mock = h
        .primary
        .mock("POST", "/api/detect")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(detection_body())
        .expect(1)
        .create_async()
        .await;

    std::fs::create_dir_all(h.samples_dir()).unwrap();
    std::fs::write(h.samples_dir().join("testing.png"), b"\x89PNG\r\n\x1a\nrest").unwrap();

    let state = h.state();
    let stored = analysis::analyze_sample(&state, "testing.png", false, None)
        .await
        .unwrap();
    assert_eq!(stored.file_name, "testing.png");

    let missing = analysis::analyze_sample(&state, "192.jpg", false, None).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_download_results_csv_and_new_analysis() {
    let mut h = Harness::new().await;
    let _detect = h
        .primary
        .mock("POST", "/api/detect")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(detection_body())
        .create_async()
        .await;
    let _primary_csv = h
        .primary
        .mock("GET", "/api/files/results.csv")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let secondary_csv = h
        .secondary
        .mock("GET", "/api/files/results.csv")
        .with_status(200)
        .with_body("id,height_mm\n1,50.0\n")
        .expect(1)
        .create_async()
        .await;

    let state = h.state();
    let image = h.write_image("bench.gif");
    analysis::analyze_image(&state, &image, false, None)
        .await
        .unwrap();

    let out = h.dir.path().join("downloads");
    let path = results::download_results_csv(&state, &out, None)
        .await
        .unwrap();
    secondary_csv.assert_async().await;
    assert_eq!(path, out.join("results.csv"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,height_mm\n1,50.0\n");

    results::new_analysis(&state).unwrap();
    assert!(results::get_results(&state).is_err());
    let err = results::download_results_csv(&state, &out, None)
        .await
        .unwrap_err();
    assert!(err.contains("No results found"));
}

#[tokio::test]
async fn test_save_result_images() {
    let mut h = Harness::new().await;
    let _detect = h
        .primary
        .mock("POST", "/api/detect")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(detection_body())
        .create_async()
        .await;
    let _out = h
        .primary
        .mock("GET", "/api/images/out.png")
        .with_status(200)
        .with_body("out-bytes")
        .create_async()
        .await;
    let _analysis = h
        .primary
        .mock("GET", "/api/images/analysis.png")
        .with_status(200)
        .with_body("analysis-bytes")
        .create_async()
        .await;

    let state = h.state();
    let image = h.write_image("bench.gif");
    analysis::analyze_image(&state, &image, false, None)
        .await
        .unwrap();

    let out = h.dir.path().join("images");
    let saved = results::save_result_images(&state, &out, None).await.unwrap();
    assert_eq!(saved, vec![out.join("out.png"), out.join("analysis.png")]);
    assert_eq!(std::fs::read_to_string(out.join("out.png")).unwrap(), "out-bytes");
    assert_eq!(
        std::fs::read_to_string(out.join("analysis.png")).unwrap(),
        "analysis-bytes"
    );
}

#[tokio::test]
async fn test_save_result_images_refuses_name_collision() {
    let mut h = Harness::new().await;
    let _detect = h
        .primary
        .mock("POST", "/api/detect")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "metrics": {"nail_count": 1},
                "output_image": "/api/images/run_1/result.png",
                "analysis_image": "/api/images/run_2/result.png",
                "results_csv": "results.csv"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let images = h
        .primary
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let state = h.state();
    let image = h.write_image("bench.gif");
    analysis::analyze_image(&state, &image, false, None)
        .await
        .unwrap();

    let out = h.dir.path().join("images");
    let err = results::save_result_images(&state, &out, None)
        .await
        .unwrap_err();

    images.assert_async().await;
    assert!(err.contains("result.png"), "unexpected error: {}", err);
    assert!(!out.join("result.png").exists());
}

#[tokio::test]
async fn test_switch_backend_persists_across_restart() {
    let h = Harness::new().await;

    let state = h.state();
    let info = backend::get_backend(&state);
    assert_eq!(info.backend, Backend::Primary);
    assert_eq!(info.url, h.primary.url());

    let info = backend::switch_backend(&state, true);
    assert_eq!(info.backend, Backend::Secondary);
    assert_eq!(info.url, h.secondary.url());

    let restarted = h.state();
    assert_eq!(backend::get_backend(&restarted).backend, Backend::Secondary);
}

#[tokio::test]
async fn test_run_evaluation() {
    let mut h = Harness::new().await;
    let _mock = h
        .primary
        .mock("POST", "/api/evaluate")
        .match_body(Matcher::Json(json!({"test_dir": "dataset/test"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"metrics": {"mAP": 0.71}, "evaluation_results_image": "eval.png"}).to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let state = h.state();
    let result = evaluation::run_evaluation(&state, " dataset/test ", None)
        .await
        .unwrap();
    assert_eq!(result.evaluation_results_image, "eval.png");

    let err = evaluation::run_evaluation(&state, "   ", None).await.unwrap_err();
    assert!(err.contains("cannot be empty"));
}

#[test]
fn test_list_samples() {
    assert_eq!(analysis::list_samples(false), vec!["test.jpg", "testing.png"]);
    assert_eq!(analysis::list_samples(true).len(), 66);
}
