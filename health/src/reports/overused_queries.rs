use super::{FetchOptions, SYSTEM_ACTIVITY, run_query};
use crate::models::{OverusedQueries, QueryUsage, Report};
use crate::stats::{SortOrder, TOP_N, top_n};
use common::Result;
use looker::LookerApi;
use looker::models::{QueryRequest, Row, RowExt};

const LOOKBACK: &str = "last 30 days";
const CANDIDATES: usize = 50;

/// Queries that hit the database most often over the last 30 days.
pub async fn compute_report(api: &dyn LookerApi, options: &FetchOptions) -> Result<Report> {
    let query = QueryRequest::new(SYSTEM_ACTIVITY, "history")
        .fields([
            "query.view",
            "query.model",
            "query.id",
            "history.issuer_source",
            "history.source",
            "history.database_result_query_count",
        ])
        .filter("history.created_date", LOOKBACK)
        .limit(CANDIDATES)
        .sort("history.database_result_query_count desc");

    let rows = run_query(api, options, &query).await?;
    summarize(&rows)
}

fn summarize(rows: &[Row]) -> Result<Report> {
    let queries = rows
        .iter()
        .map(|row| -> Result<QueryUsage> {
            Ok(QueryUsage {
                model_name: row.key("query.model")?,
                explore_name: row.key("query.view")?,
                query_id: row.key("query.id")?,
                issuer_source: row.optional_key("history.issuer_source")?.unwrap_or_default(),
                source: row.optional_key("history.source")?.unwrap_or_default(),
                database_run_count: row.count("history.database_result_query_count")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let busiest = top_n(queries, TOP_N, SortOrder::Descending, |q| {
        q.database_run_count as f64
    });
    Ok(Report::OverusedQueries(OverusedQueries::new(busiest)?))
}
