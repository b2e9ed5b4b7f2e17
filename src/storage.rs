//! Saved plan documents.
//!
//! A document pairs the vacation request with the itinerary planned for it,
//! so a later run with the same request can skip the planning call.

use crate::{
    error::Result,
    vacation_types::{TravelPlan, VacationInfo},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{debug, info, warn};

pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const OUTPUT_FILE: &str = "output.json";
pub const REVISED_OUTPUT_FILE: &str = "revised_output.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub vacation_info: VacationInfo,
    pub itinerary: TravelPlan,
}

impl PlanDocument {
    pub fn new(vacation_info: VacationInfo, itinerary: TravelPlan) -> Self {
        Self {
            vacation_info,
            itinerary,
        }
    }
}

/// Write `document` as pretty JSON, creating parent directories as needed.
pub fn save_plan_document(path: impl AsRef<Path>, document: &PlanDocument) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(document)?)?;
    info!(target: "itinerary::storage", path = %path.display(), "plan document saved");
    Ok(())
}

pub fn load_plan_document(path: impl AsRef<Path>) -> Result<PlanDocument> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// The saved itinerary at `path`, if it was planned for exactly `vacation`.
///
/// A missing file, an unreadable document or a different request all yield
/// `None`; the caller plans again.
pub fn load_reusable_plan(path: impl AsRef<Path>, vacation: &VacationInfo) -> Option<TravelPlan> {
    let path = path.as_ref();
    if !path.exists() {
        return None;
    }

    match load_plan_document(path) {
        Ok(document) if document.vacation_info == *vacation => {
            info!(target: "itinerary::storage", path = %path.display(), "reusing saved itinerary");
            Some(document.itinerary)
        }
        Ok(_) => {
            debug!(
                target: "itinerary::storage",
                path = %path.display(),
                "saved itinerary was planned for another request"
            );
            None
        }
        Err(err) => {
            warn!(
                target: "itinerary::storage",
                path = %path.display(),
                error = %err,
                "discarding unreadable plan document"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evals::fixtures;
    use tempfile::tempdir;

    #[test]
    fn test_save_creates_directory_and_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(OUTPUT_FILE);
        let document = PlanDocument::new(fixtures::vacation(), fixtures::plan());

        save_plan_document(&path, &document).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"vacation_info\""));

        assert_eq!(load_plan_document(&path).unwrap(), document);
    }

    #[test]
    fn test_reuse_requires_identical_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE);
        let vacation = fixtures::vacation();
        save_plan_document(&path, &PlanDocument::new(vacation.clone(), fixtures::plan())).unwrap();

        assert_eq!(load_reusable_plan(&path, &vacation), Some(fixtures::plan()));

        let mut other = vacation;
        other.budget += 1;
        assert_eq!(load_reusable_plan(&path, &other), None);
    }

    #[test]
    fn test_missing_or_corrupt_file_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE);
        assert_eq!(load_reusable_plan(&path, &fixtures::vacation()), None);

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_reusable_plan(&path, &fixtures::vacation()), None);
        assert!(load_plan_document(&path).is_err());
    }
}
