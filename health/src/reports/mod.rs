//! One orchestrator per health check.
//!
//! Every report follows the same shape: fetch the collections it needs
//! (retrying each remote call, paging list endpoints, fanning out per-explore
//! lookups), join usage facts onto the catalog, reduce to a payload and let
//! the payload derive its grade. Nothing is shared between invocations.

pub mod abandoned_dashboards;
pub mod inactive_users;
pub mod large_explores;
pub mod overused_queries;
pub mod slow_explores;
pub mod unused_explores;
pub mod unused_fields;

use crate::models::{CatalogExplore, Report, ReportKind};
use common::config::Settings;
use common::Result;
use looker::models::{QueryRequest, Row};
use looker::{Exhaustion, LookerApi, RetryPolicy, collect_pages, fan_out};
use tracing::{debug, info};

/// Model holding Looker's own usage history.
pub(crate) const SYSTEM_ACTIVITY: &str = "system__activity";

/// Row cap for usage-history queries.
pub(crate) const HISTORY_LIMIT: usize = 50_000;

/// Knobs shared by every remote call a report makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub retry: RetryPolicy,
    pub page_size: usize,
    pub concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            page_size: 100,
            concurrency: 16,
        }
    }
}

impl From<&Settings> for FetchOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            retry: RetryPolicy::from(&settings.retry),
            page_size: settings.fetch.page_size,
            concurrency: settings.fetch.concurrency,
        }
    }
}

/// Runs the report identified by `kind`.
pub async fn compute(
    kind: ReportKind,
    api: &dyn LookerApi,
    options: &FetchOptions,
) -> Result<Report> {
    info!(test_id = kind.test_id(), "Computing report");
    let report = match kind {
        ReportKind::InactiveUsers => inactive_users::compute_report(api, options).await,
        ReportKind::SlowExplores => slow_explores::compute_report(api, options).await,
        ReportKind::LargeExplores => large_explores::compute_report(api, options).await,
        ReportKind::UnusedExplores => unused_explores::compute_report(api, options).await,
        ReportKind::UnusedFields => unused_fields::compute_report(api, options).await,
        ReportKind::ExploresWithUnusedFields => {
            unused_fields::compute_explores_report(api, options).await
        }
        ReportKind::AbandonedDashboards => abandoned_dashboards::compute_report(api, options).await,
        ReportKind::OverusedQueries => overused_queries::compute_report(api, options).await,
    }?;
    info!(test_id = kind.test_id(), grade = %report.grade(), "Report done");
    Ok(report)
}

/// Runs one inline query through the retry policy.
pub(crate) async fn run_query(
    api: &dyn LookerApi,
    options: &FetchOptions,
    query: &QueryRequest,
) -> Result<Vec<Row>> {
    let rows = options.retry.run(|| api.run_inline_query(query)).await?;
    debug!(view = %query.view, rows = rows.len(), "Query returned");
    Ok(rows)
}

/// Every explore in the catalog, in model-listing order.
///
/// Models and explores without a name cannot be joined against and are dropped.
pub(crate) async fn fetch_catalog(
    api: &dyn LookerApi,
    options: &FetchOptions,
) -> Result<Vec<CatalogExplore>> {
    let models = collect_pages(
        &options.retry,
        options.page_size,
        Exhaustion::ShortPage,
        |limit, offset| api.all_lookml_models(limit, offset),
    )
    .await?;

    let explores: Vec<CatalogExplore> = models
        .into_iter()
        .filter_map(|model| Some((model.name?, model.explores?)))
        .flat_map(|(model_name, explores)| {
            explores.into_iter().filter_map(move |explore| {
                Some(CatalogExplore {
                    model_name: model_name.clone(),
                    explore_name: explore.name?,
                    hidden: explore.hidden.unwrap_or(false),
                })
            })
        })
        .collect();

    debug!(explores = explores.len(), "Fetched explore catalog");
    Ok(explores)
}

/// Field names of each explore; `result[i]` belongs to `explores[i]`.
pub(crate) async fn fetch_field_names(
    api: &dyn LookerApi,
    options: &FetchOptions,
    explores: &[CatalogExplore],
) -> Result<Vec<Vec<String>>> {
    fan_out(explores, options.concurrency, |explore| async move {
        let fields = options
            .retry
            .run(|| api.explore_fields(&explore.model_name, &explore.explore_name))
            .await?;
        Ok(fields.names())
    })
    .await
}
