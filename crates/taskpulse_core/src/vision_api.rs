use crate::error::AppError;
use crate::model::ProjectVision;
use crate::storage::json_store::{Collection, Store};

/// The stored vision, or an empty one when none has been written yet.
pub fn get_vision(store: &Store) -> Result<ProjectVision, AppError> {
    let stored: Vec<ProjectVision> = store.load(Collection::Vision)?;
    Ok(stored.into_iter().next().unwrap_or_default())
}

pub fn save_vision(store: &Store, vision: ProjectVision) -> Result<ProjectVision, AppError> {
    store.save(Collection::Vision, std::slice::from_ref(&vision))?;
    tracing::info!(chars = vision.text.chars().count(), "vision saved");
    Ok(vision)
}

#[cfg(test)]
mod tests {
    use super::{get_vision, save_vision};
    use crate::model::ProjectVision;
    use crate::storage::json_store::Store;

    #[test]
    fn missing_vision_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        assert_eq!(get_vision(&store).unwrap(), ProjectVision::default());
    }

    #[test]
    fn saved_vision_replaces_previous_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        save_vision(&store, ProjectVision { text: "Ship v1".to_string() }).unwrap();
        save_vision(&store, ProjectVision { text: "Ship v2 by June".to_string() }).unwrap();

        assert_eq!(get_vision(&store).unwrap().text, "Ship v2 by June");
    }
}
