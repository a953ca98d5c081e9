pub mod client;
pub mod failover;
pub mod image;
pub mod normalize;
pub mod types;

pub use client::{resolve_resource_url, ApiClient, FILES_PREFIX, IMAGES_PREFIX};
pub use failover::AttemptPlan;
pub use image::ImagePayload;
pub use normalize::normalize_metrics;
pub use types::{DetectionResult, EvaluationRequest, EvaluationResult, Metrics, NailDetail};
