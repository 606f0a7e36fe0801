//! Autocomplete suggestions feeding the candidate tables.

use super::PipelineContext;
use crate::error::PipelineResult;
use crate::models::{AutocompleteEntity, AutocompleteMatch};

async fn suggest(
    ctx: &PipelineContext,
    entity: AutocompleteEntity,
    name_part: &str,
) -> PipelineResult<Vec<AutocompleteMatch>> {
    let name_part = name_part.trim();
    if name_part.is_empty() {
        return Ok(Vec::new());
    }
    Ok(ctx.client.autocomplete(entity, name_part).await?)
}

/// Institutions matching a partial name. Blank input yields no candidates.
///
/// # Errors
///
/// Propagates client errors.
pub async fn suggest_institutions(ctx: &PipelineContext, name_part: &str) -> PipelineResult<Vec<AutocompleteMatch>> {
    suggest(ctx, AutocompleteEntity::Institutions, name_part).await
}

/// Authors matching a partial name. Blank input yields no candidates.
///
/// # Errors
///
/// Propagates client errors.
pub async fn suggest_authors(ctx: &PipelineContext, name_part: &str) -> PipelineResult<Vec<AutocompleteMatch>> {
    suggest(ctx, AutocompleteEntity::Authors, name_part).await
}
