use super::{FetchOptions, HISTORY_LIMIT, SYSTEM_ACTIVITY, run_query};
use crate::join::join_counts;
use crate::models::{AbandonedDashboards, DashboardRecord, Report, UsageRecord};
use crate::stats::{TOP_N, percentage};
use common::Result;
use looker::LookerApi;
use looker::models::{Dashboard, QueryRequest, Row, RowExt};
use tracing::debug;

const LOOKBACK: &str = "last 90 days";

/// Dashboards that ran no query in the last 90 days.
pub async fn compute_report(api: &dyn LookerApi, options: &FetchOptions) -> Result<Report> {
    let query = QueryRequest::new(SYSTEM_ACTIVITY, "history")
        .fields(["dashboard.id", "history.query_run_count"])
        .filter("history.created_date", LOOKBACK)
        .limit(HISTORY_LIMIT);

    let (dashboards, rows) = futures::try_join!(
        options.retry.run(|| api.all_dashboards()),
        run_query(api, options, &query)
    )?;

    summarize(dashboards, &usage(&rows)?)
}

/// Rows not attributed to a dashboard (ad hoc explore queries) are skipped.
fn usage(rows: &[Row]) -> Result<Vec<UsageRecord<String>>> {
    let mut usage = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(dashboard_id) = row.optional_key("dashboard.id")? {
            usage.push(UsageRecord::new(
                dashboard_id,
                row.count("history.query_run_count")?,
            ));
        }
    }
    Ok(usage)
}

fn summarize(dashboards: Vec<Dashboard>, usage: &[UsageRecord<String>]) -> Result<Report> {
    let dashboards: Vec<DashboardRecord> = dashboards
        .into_iter()
        .filter_map(|dashboard| {
            Some(DashboardRecord {
                id: dashboard.id?,
                title: dashboard.title.unwrap_or_default(),
                query_count: 0,
            })
        })
        .collect();

    let counts = join_counts(&dashboards, |d| d.id.clone(), usage);
    let total = dashboards.len();
    let abandoned: Vec<DashboardRecord> = dashboards
        .into_iter()
        .zip(counts)
        .filter(|(_, query_count)| *query_count == 0)
        .map(|(dashboard, query_count)| DashboardRecord {
            query_count,
            ..dashboard
        })
        .collect();
    debug!(total, abandoned = abandoned.len(), "Joined dashboards against usage");

    let count_abandoned = abandoned.len();
    let pct_abandoned = percentage(count_abandoned, total)?;
    let sample = abandoned.into_iter().take(TOP_N).collect();

    Ok(Report::AbandonedDashboards(AbandonedDashboards::new(
        pct_abandoned,
        count_abandoned,
        sample,
    )?))
}
