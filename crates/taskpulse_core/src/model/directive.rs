use serde::{Deserialize, Serialize};

/// Free-text steering instruction folded into AI prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiDirective {
    pub id: String,
    pub text: String,
}
