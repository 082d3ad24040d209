use super::{FetchOptions, HISTORY_LIMIT, SYSTEM_ACTIVITY, run_query};
use crate::join::join_counts;
use crate::models::{InactiveUsers, Report, UsageRecord, UserRecord};
use crate::stats::{TOP_N, percentage, sample_first};
use common::Result;
use looker::models::{QueryRequest, Row, RowExt, User};
use looker::{Exhaustion, LookerApi, collect_pages};
use tracing::debug;

const LOOKBACK: &str = "last 30 days";

/// Share of customer accounts that ran no query in the last 30 days, with a
/// few of their display names.
pub async fn compute_report(api: &dyn LookerApi, options: &FetchOptions) -> Result<Report> {
    let query = QueryRequest::new(SYSTEM_ACTIVITY, "history")
        .fields(["history.user_id"])
        .filter("history.created_date", LOOKBACK)
        .limit(HISTORY_LIMIT);

    let (rows, users) = futures::try_join!(
        run_query(api, options, &query),
        collect_pages(
            &options.retry,
            options.page_size,
            Exhaustion::EmptyPage,
            |limit, offset| api.all_users(limit, offset),
        )
    )?;

    let usage = activity(&rows)?;
    let (inactive, countable) = inactive_users(users, &usage);
    debug!(countable, inactive = inactive.len(), "Joined users against activity");

    let pct_inactive = percentage(inactive.len(), countable)?;
    let sample_user_names = sample_first(&inactive, TOP_N, |user| async move {
        options
            .retry
            .run(|| api.user_display_name(&user.id))
            .await
    })
    .await?;

    Ok(Report::InactiveUsers(InactiveUsers::new(
        pct_inactive,
        sample_user_names,
    )?))
}

/// One usage record per history row that is attributed to a user.
fn activity(rows: &[Row]) -> Result<Vec<UsageRecord<String>>> {
    let mut usage = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(user_id) = row.optional_key("history.user_id")? {
            usage.push(UsageRecord::new(user_id, 1));
        }
    }
    Ok(usage)
}

/// Countable users without activity, in listing order, plus the number of
/// countable users.
fn inactive_users(users: Vec<User>, usage: &[UsageRecord<String>]) -> (Vec<UserRecord>, usize) {
    let countable: Vec<UserRecord> = users
        .into_iter()
        .filter_map(|user| {
            Some(UserRecord {
                id: user.id?,
                is_disabled: user.is_disabled.unwrap_or(false),
                is_internal_employee: user.verified_looker_employee.unwrap_or(false),
            })
        })
        .filter(UserRecord::is_countable)
        .collect();

    let activity = join_counts(&countable, |user| user.id.clone(), usage);
    let total = countable.len();
    let inactive = countable
        .into_iter()
        .zip(activity)
        .filter(|(_, runs)| *runs == 0)
        .map(|(user, _)| user)
        .collect();

    (inactive, total)
}
