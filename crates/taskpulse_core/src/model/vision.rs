use serde::{Deserialize, Serialize};

/// The project's guiding statement, shown on the notice board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectVision {
    #[serde(default)]
    pub text: String,
}
