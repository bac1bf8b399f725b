use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::ExplorerError;

/// Header fields of a Lottie animation document. The explorer shows these in
/// the sidebar banner instead of playing the animation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationSummary {
    #[serde(rename = "nm", default)]
    pub name: Option<String>,
    #[serde(rename = "w")]
    pub width: f64,
    #[serde(rename = "h")]
    pub height: f64,
    #[serde(rename = "fr")]
    pub frame_rate: f64,
    #[serde(rename = "ip", default)]
    pub in_point: f64,
    #[serde(rename = "op", default)]
    pub out_point: f64,
}

impl AnimationSummary {
    pub fn from_json(url: &str, document: &JsonValue) -> Result<Self, ExplorerError> {
        Self::deserialize(document)
            .map_err(|e| ExplorerError::remote(url, format!("not a Lottie animation: {e}")))
    }

    pub fn frame_count(&self) -> f64 {
        (self.out_point - self.in_point).max(0.0)
    }

    pub fn duration_secs(&self) -> Option<f64> {
        (self.frame_rate > 0.0).then(|| self.frame_count() / self.frame_rate)
    }

    /// One-line description for the banner, e.g. `Comet · 500×400 · 2.0 s`.
    pub fn banner_text(&self) -> String {
        let mut parts = vec![self.name.clone().unwrap_or_else(|| "Animation".to_string())];
        parts.push(format!("{:.0}×{:.0}", self.width, self.height));
        if let Some(secs) = self.duration_secs() {
            parts.push(format!("{secs:.1} s"));
        }
        parts.join(" · ")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn summarizes_header() {
        let doc = json!({
            "v": "5.7.4", "nm": "Comet", "w": 500, "h": 400,
            "fr": 30, "ip": 0, "op": 60, "layers": []
        });
        let summary = AnimationSummary::from_json("u", &doc).unwrap();
        assert_eq!(summary.name.as_deref(), Some("Comet"));
        assert_eq!(summary.frame_count(), 60.0);
        assert_eq!(summary.duration_secs(), Some(2.0));
        assert_eq!(summary.banner_text(), "Comet · 500×400 · 2.0 s");
    }

    #[test]
    fn zero_frame_rate_has_no_duration() {
        let doc = json!({ "w": 10, "h": 10, "fr": 0 });
        let summary = AnimationSummary::from_json("u", &doc).unwrap();
        assert_eq!(summary.duration_secs(), None);
        assert_eq!(summary.banner_text(), "Animation · 10×10");
    }

    #[test]
    fn rejects_non_animation() {
        let err = AnimationSummary::from_json("u", &json!({ "type": "Topology" })).unwrap_err();
        assert!(err.to_string().contains("not a Lottie animation"));
    }
}
