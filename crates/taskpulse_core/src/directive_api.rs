use crate::error::AppError;
use crate::model::AiDirective;
use crate::storage::json_store::{Collection, Store};
use std::collections::HashSet;

pub fn list_directives(store: &Store) -> Result<Vec<AiDirective>, AppError> {
    store.load(Collection::Directives)
}

/// Replaces the stored list wholesale. Blank texts are dropped.
pub fn replace_directives(
    store: &Store,
    directives: Vec<AiDirective>,
) -> Result<Vec<AiDirective>, AppError> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(directives.len());
    for directive in directives {
        if directive.text.trim().is_empty() {
            continue;
        }
        if !seen.insert(directive.id.clone()) {
            return Err(AppError::invalid_input(format!(
                "duplicate directive id {}",
                directive.id
            )));
        }
        kept.push(directive);
    }

    store.save(Collection::Directives, &kept)?;
    tracing::info!(count = kept.len(), "directives replaced");
    Ok(kept)
}
