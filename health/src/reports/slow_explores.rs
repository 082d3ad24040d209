use super::{FetchOptions, SYSTEM_ACTIVITY, run_query};
use crate::models::{ExplorePerformance, Report, SlowExplores};
use crate::stats::{SortOrder, TOP_N, top_n};
use common::Result;
use looker::LookerApi;
use looker::models::{QueryRequest, Row, RowExt};

const LOOKBACK: &str = "last 90 days";
const CANDIDATES: usize = 10;

/// Explores with the longest average runtime over the last 90 days.
pub async fn compute_report(api: &dyn LookerApi, options: &FetchOptions) -> Result<Report> {
    let query = QueryRequest::new(SYSTEM_ACTIVITY, "history")
        .fields([
            "query.view",
            "query.model",
            "history.average_runtime",
            "history.max_runtime",
        ])
        .filter("history.created_date", LOOKBACK)
        .limit(CANDIDATES)
        .sort("history.average_runtime desc");

    let rows = run_query(api, options, &query).await?;
    summarize(&rows)
}

fn summarize(rows: &[Row]) -> Result<Report> {
    let explores = rows
        .iter()
        .map(|row| -> Result<ExplorePerformance> {
            Ok(ExplorePerformance {
                model_name: row.key("query.model")?,
                explore_name: row.key("query.view")?,
                avg_runtime: row.number("history.average_runtime")?,
                max_runtime: row.number("history.max_runtime")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let slowest = top_n(explores, TOP_N, SortOrder::Descending, |e| e.avg_runtime);
    Ok(Report::SlowExplores(SlowExplores::new(slowest)?))
}
