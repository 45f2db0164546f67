// SPDX-License-Identifier: Apache-2.0

//! Loading pass parameters from JSON files.
//!
//! Parameter structs default every field, so a file only needs to name the
//! settings it changes.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

pub fn load_params<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading parameters from {}", path.display()))?;
    let params = serde_json::from_str(&text)
        .with_context(|| format!("parsing parameters in {}", path.display()))?;
    log::debug!("loaded parameters from {}", path.display());
    Ok(params)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::cut_rewriting::{CandidateSelection, CutRewritingParams};
    use crate::reconv_cut::ReconvCutParams;

    #[test]
    fn test_partial_file_overrides_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cut_enumeration": {{"cut_size": 6}}, "candidate_selection_strategy": "greedy"}}"#
        )
        .unwrap();
        let params: CutRewritingParams = load_params(file.path()).unwrap();
        assert_eq!(params.cut_enumeration.cut_size, 6);
        assert_eq!(params.cut_enumeration.cut_limit, 12);
        assert_eq!(params.candidate_selection_strategy, CandidateSelection::Greedy);
        assert!(!params.allow_zero_gain);
    }

    #[test]
    fn test_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = load_params::<ReconvCutParams>(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.json"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let err = load_params::<ReconvCutParams>(&bad).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing parameters"));
    }
}
