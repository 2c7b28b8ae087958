//! Build options.

use serde::Deserialize;

/// Display defaults applied while building a notebook model.
///
/// Deserializes from a partial JSON object; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Source mimetype of code cells when the notebook has no
    /// `metadata.language_info.mimetype`.
    pub fallback_mimetype: String,
    pub cell_metadata_header: String,
    pub notebook_metadata_header: String,
    /// Whether metadata models start collapsed.
    pub collapse_metadata: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            fallback_mimetype: "text/python".to_string(),
            cell_metadata_header: "Metadata changed".to_string(),
            notebook_metadata_header: "Notebook metadata changed".to_string(),
            collapse_metadata: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_options_keep_defaults() {
        let opts: ModelOptions =
            serde_json::from_value(json!({"fallback_mimetype": "text/x-julia"})).unwrap();
        assert_eq!(opts.fallback_mimetype, "text/x-julia");
        assert_eq!(opts.cell_metadata_header, "Metadata changed");
        assert!(opts.collapse_metadata);
    }

    #[test]
    fn empty_object_is_default() {
        let opts: ModelOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(opts, ModelOptions::default());
    }
}
