//! Global-South collaboration dashboard.
//!
//! For each year in the lookback window: the share of works with at least one
//! Global-South institution among all works grouped as south or north.
//! OpenAlex counts a work in both groups when its authorship mixes regions, so
//! the denominator is `south + north`, not the number of distinct works.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde_json::json;

use super::{Dashboard, PipelineContext};
use crate::aggregate;
use crate::config::api;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{GlobalSouthInput, GlobalSouthSeries, YearlyRatio};
use crate::session::Snapshot;

/// Group key for per-year counts.
pub const GROUP_BY_YEAR: &str = "publication_year";

/// OpenAlex filter for one side of the ratio.
#[must_use]
pub fn global_south_filter(years: &[i32], institution_ids: Option<&[String]>, south: bool) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(ids) = institution_ids {
        parts.push(format!("authorships.institutions.id:{}", ids.join("|")));
    }
    parts.push(format!("authorships.institutions.is_global_south:{south}"));
    let years = years.iter().map(ToString::to_string).collect::<Vec<_>>().join("|");
    parts.push(format!("publication_year:{years}"));
    parts.join(",")
}

async fn ratio_series(
    ctx: &PipelineContext,
    years: &[i32],
    institution_ids: Option<&[String]>,
) -> PipelineResult<Vec<YearlyRatio>> {
    let south = ctx
        .client
        .group_works_by(&global_south_filter(years, institution_ids, true), GROUP_BY_YEAR)
        .await?;
    let north = ctx
        .client
        .group_works_by(&global_south_filter(years, institution_ids, false), GROUP_BY_YEAR)
        .await?;

    Ok(aggregate::share_series(
        years,
        &aggregate::counts_from_buckets(&south),
        &aggregate::counts_from_buckets(&north),
    ))
}

/// Yearly Global-South percentage, globally and for the given institutions.
///
/// `institution_ids` must be bare OpenAlex ids; when empty only the global
/// series is computed.
///
/// # Errors
///
/// `Validation` if the context's lookback is out of range; client errors otherwise.
pub async fn get_percentage_gs_per_year(
    ctx: &PipelineContext,
    institution_ids: &[String],
    current_year: i32,
) -> PipelineResult<GlobalSouthSeries> {
    if !(1..=api::MAX_LOOKBACK_YEARS).contains(&ctx.lookback_years) {
        return Err(PipelineError::validation(
            "lookback_years",
            format!("must be between 1 and {}", api::MAX_LOOKBACK_YEARS),
        ));
    }
    let years = aggregate::lookback_window(current_year, ctx.lookback_years);

    let global = ratio_series(ctx, &years, None).await?;
    let local = if institution_ids.is_empty() {
        None
    } else {
        Some(ratio_series(ctx, &years, Some(institution_ids)).await?)
    };

    tracing::info!(
        years = years.len(),
        institutions = institution_ids.len(),
        "Global South series computed"
    );

    Ok(GlobalSouthSeries { years, institution_ids: institution_ids.to_vec(), global, local })
}

/// "Does my institute collaborate with the global south?"
pub struct GlobalSouthDashboard;

#[async_trait::async_trait]
impl Dashboard for GlobalSouthDashboard {
    fn name(&self) -> &'static str {
        "global_south"
    }

    fn description(&self) -> &'static str {
        "Does my institute collaborate with the global south?"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "institutionIds": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "OpenAlex institution ids; empty for the global series only"
                }
            }
        })
    }

    async fn execute(
        &self,
        ctx: &PipelineContext,
        input: serde_json::Value,
        _previous: Option<Arc<Snapshot>>,
    ) -> PipelineResult<Snapshot> {
        let params: GlobalSouthInput = if input.is_null() {
            GlobalSouthInput::default()
        } else {
            serde_json::from_value(input)?
        };
        let ids = params.normalized_ids()?;

        let series = get_percentage_gs_per_year(ctx, &ids, Utc::now().year()).await?;
        Ok(Snapshot::GlobalSouth(series))
    }
}
