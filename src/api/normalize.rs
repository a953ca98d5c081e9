use serde_json::{Map, Value};

/// Alias key used by the backend -> canonical key.
pub const METRIC_ALIASES: [(&str, &str); 2] = [
    ("nails_detected", "nail_count"),
    ("matches_found", "match_count"),
];

/// Copy alias values onto their canonical keys, keeping the alias keys.
///
/// Running this twice yields the same mapping as running it once.
pub fn normalize_metrics(metrics: &mut Map<String, Value>) {
    for (alias, canonical) in METRIC_ALIASES {
        if let Some(value) = metrics.get(alias).cloned() {
            metrics.insert(canonical.to_string(), value);
        }
    }
}
