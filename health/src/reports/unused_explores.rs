use super::{FetchOptions, HISTORY_LIMIT, SYSTEM_ACTIVITY, fetch_catalog, run_query};
use crate::join::join_counts;
use crate::models::{
    CatalogExplore, ExploreKey, ExploreQueries, Report, UnusedExplores, UsageRecord,
};
use crate::stats::{SortOrder, TOP_N, UNUSED_THRESHOLD, percentage, top_n};
use common::Result;
use looker::LookerApi;
use looker::models::{QueryRequest, Row, RowExt};
use tracing::debug;

const LOOKBACK: &str = "last 90 days";

/// Visible explores run fewer than 50 times in production over the last 90 days.
pub async fn compute_report(api: &dyn LookerApi, options: &FetchOptions) -> Result<Report> {
    let query = QueryRequest::new(SYSTEM_ACTIVITY, "history")
        .fields(["query.model", "query.view", "history.query_run_count"])
        .filter("history.created_date", LOOKBACK)
        .filter("history.workspace_id", "production")
        .limit(HISTORY_LIMIT);

    let (rows, catalog) =
        futures::try_join!(run_query(api, options, &query), fetch_catalog(api, options))?;

    summarize(catalog, &usage(&rows)?)
}

fn usage(rows: &[Row]) -> Result<Vec<UsageRecord<ExploreKey>>> {
    rows.iter()
        .map(|row| {
            let key = (row.key("query.model")?, row.key("query.view")?);
            Ok(UsageRecord::new(key, row.count("history.query_run_count")?))
        })
        .collect()
}

fn summarize(catalog: Vec<CatalogExplore>, usage: &[UsageRecord<ExploreKey>]) -> Result<Report> {
    let visible: Vec<CatalogExplore> = catalog.into_iter().filter(|e| !e.hidden).collect();
    let runs = join_counts(&visible, CatalogExplore::key, usage);
    let total = visible.len();

    let unused: Vec<ExploreQueries> = visible
        .into_iter()
        .zip(runs)
        .filter(|(_, query_count)| *query_count < UNUSED_THRESHOLD)
        .map(|(explore, query_count)| ExploreQueries {
            model_name: explore.model_name,
            explore_name: explore.explore_name,
            query_count,
        })
        .collect();
    debug!(total, unused = unused.len(), "Joined explores against usage");

    let unused_count = unused.len();
    let unused_percentage = percentage(unused_count, total)?;
    let least_used = top_n(unused, TOP_N, SortOrder::Ascending, |e| e.query_count as f64);

    Ok(Report::UnusedExplores(UnusedExplores::new(
        least_used,
        unused_count,
        unused_percentage,
    )?))
}
