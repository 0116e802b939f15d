//! Marker image lookup.
//!
//! Images are opaque to the rig: only their paths are resolved and checked
//! here, all at once, before any geometry is built.

use crate::error::RigError;
use crate::marker::MarkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// `ArucoMarker<id>.png`
pub fn default_marker_file_name(id: MarkerId) -> String {
    format!("ArucoMarker{id}.png")
}

/// Where marker images live, with optional per-id overrides.
///
/// Relative overrides are resolved against `dir`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerImages {
    pub dir: PathBuf,
    #[serde(default)]
    pub overrides: BTreeMap<MarkerId, PathBuf>,
}

impl MarkerImages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, id: MarkerId, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(id, path.into());
        self
    }

    pub fn path_for(&self, id: MarkerId) -> PathBuf {
        match self.overrides.get(&id) {
            Some(p) => self.dir.join(p),
            None => self.dir.join(default_marker_file_name(id)),
        }
    }

    /// Resolve every id to an existing file, reporting all missing ones together.
    pub fn check<I>(&self, ids: I) -> Result<BTreeMap<MarkerId, PathBuf>, RigError>
    where
        I: IntoIterator<Item = MarkerId>,
    {
        let mut found = BTreeMap::new();
        let mut missing = Vec::new();
        for id in ids {
            let path = self.path_for(id);
            if path.is_file() {
                found.insert(id, path);
            } else {
                missing.push(path);
            }
        }
        if missing.is_empty() {
            log::debug!("resolved {} marker image(s)", found.len());
            Ok(found)
        } else {
            missing.sort();
            missing.dedup();
            Err(RigError::MissingResource { paths: missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn id(n: u8) -> MarkerId {
        MarkerId::new(n).expect("id")
    }

    #[test]
    fn default_names_follow_marker_id() {
        let images = MarkerImages::new("/markers");
        assert_eq!(
            images.path_for(id(3)),
            PathBuf::from("/markers/ArucoMarker3.png")
        );
        let images = images.with_override(id(3), "custom/three.png");
        assert_eq!(
            images.path_for(id(3)),
            PathBuf::from("/markers/custom/three.png")
        );
    }

    #[test]
    fn missing_images_are_reported_together() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("ArucoMarker1.png"), b"stub").expect("write");
        fs::write(dir.path().join("ArucoMarker2.png"), b"stub").expect("write");

        let images = MarkerImages::new(dir.path());
        let ok = images.check([id(1), id(2)]).expect("present");
        assert_eq!(ok.len(), 2);

        match images.check(MarkerId::all()) {
            Err(RigError::MissingResource { paths }) => {
                assert_eq!(paths.len(), 6);
                assert!(paths[0].ends_with("ArucoMarker3.png"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn overrides_deserialize_from_string_keys() {
        let json = r#"{ "dir": "m", "overrides": { "4": "four.png" } }"#;
        let images: MarkerImages = serde_json::from_str(json).expect("parse");
        assert_eq!(images.path_for(id(4)), PathBuf::from("m/four.png"));

        let bad = r#"{ "dir": "m", "overrides": { "9": "nine.png" } }"#;
        assert!(serde_json::from_str::<MarkerImages>(bad).is_err());
    }
}
