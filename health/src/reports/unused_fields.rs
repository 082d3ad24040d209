//! Field usage across every explore, reported two ways: catalog-wide and per explore.

use super::{
    FetchOptions, HISTORY_LIMIT, SYSTEM_ACTIVITY, fetch_catalog, fetch_field_names, run_query,
};
use crate::join::join_counts;
use crate::models::{
    CatalogExplore, ExploreUnusedFields, ExploresWithUnusedFields, FieldUsage, Report,
    UnusedFields, UsageRecord,
};
use crate::stats::{SortOrder, TOP_N, UNUSED_THRESHOLD, percentage, top_n};
use common::Result;
use looker::LookerApi;
use looker::models::{QueryRequest, Row, RowExt};
use tracing::debug;

/// (model, explore, field) as reported by the field usage view.
type FieldKey = (String, String, String);

/// An explore together with the usage of each of its fields, in field order.
type ExploreFieldUsage = (CatalogExplore, Vec<FieldUsage>);

pub async fn compute_report(api: &dyn LookerApi, options: &FetchOptions) -> Result<Report> {
    let explores = fetch_field_usage(api, options).await?;
    unused_fields(explores)
}

pub async fn compute_explores_report(
    api: &dyn LookerApi,
    options: &FetchOptions,
) -> Result<Report> {
    let explores = fetch_field_usage(api, options).await?;
    explores_with_unused_fields(explores)
}

async fn fetch_field_usage(
    api: &dyn LookerApi,
    options: &FetchOptions,
) -> Result<Vec<ExploreFieldUsage>> {
    let query = QueryRequest::new(SYSTEM_ACTIVITY, "field_usage")
        .fields([
            "field_usage.model",
            "field_usage.explore",
            "field_usage.view",
            "field_usage.field",
            "field_usage.times_used",
        ])
        .limit(HISTORY_LIMIT);

    let (rows, catalog) =
        futures::try_join!(run_query(api, options, &query), fetch_catalog(api, options))?;
    let field_names = fetch_field_names(api, options, &catalog).await?;

    Ok(attach_usage(catalog, field_names, &usage(&rows)?))
}

fn usage(rows: &[Row]) -> Result<Vec<UsageRecord<FieldKey>>> {
    rows.iter()
        .map(|row| {
            let key = (
                row.key("field_usage.model")?,
                row.key("field_usage.explore")?,
                row.key("field_usage.field")?,
            );
            Ok(UsageRecord::new(key, row.count("field_usage.times_used")?))
        })
        .collect()
}

fn attach_usage(
    catalog: Vec<CatalogExplore>,
    field_names: Vec<Vec<String>>,
    usage: &[UsageRecord<FieldKey>],
) -> Vec<ExploreFieldUsage> {
    let fields: Vec<FieldUsage> = catalog
        .iter()
        .zip(&field_names)
        .flat_map(|(explore, names)| {
            names.iter().map(move |name| FieldUsage {
                model_name: explore.model_name.clone(),
                explore_name: explore.explore_name.clone(),
                field_name: name.clone(),
                times_used: 0,
            })
        })
        .collect();

    let counts = join_counts(
        &fields,
        |f| (f.model_name.clone(), f.explore_name.clone(), f.field_name.clone()),
        usage,
    );
    debug!(fields = fields.len(), "Joined fields against usage");

    let mut used = fields
        .into_iter()
        .zip(counts)
        .map(|(field, times_used)| FieldUsage { times_used, ..field });

    catalog
        .into_iter()
        .zip(field_names)
        .map(|(explore, names)| {
            let explore_fields = used.by_ref().take(names.len()).collect();
            (explore, explore_fields)
        })
        .collect()
}

fn is_unused(field: &FieldUsage) -> bool {
    field.times_used < UNUSED_THRESHOLD
}

fn unused_fields(explores: Vec<ExploreFieldUsage>) -> Result<Report> {
    let fields: Vec<FieldUsage> = explores.into_iter().flat_map(|(_, fields)| fields).collect();
    let total = fields.len();
    let unused: Vec<FieldUsage> = fields.into_iter().filter(is_unused).collect();

    let pct_unused = percentage(unused.len(), total)?;
    let sample = top_n(unused, TOP_N, SortOrder::Ascending, |f| f.times_used as f64);

    Ok(Report::UnusedFields(UnusedFields::new(pct_unused, sample)?))
}

/// Explores with no fields have no ratio to report and are left out.
fn explores_with_unused_fields(explores: Vec<ExploreFieldUsage>) -> Result<Report> {
    let ratios = explores
        .into_iter()
        .filter(|(_, fields)| !fields.is_empty())
        .map(|(explore, fields)| -> Result<ExploreUnusedFields> {
            let unused_count = fields.iter().filter(|f| is_unused(f)).count();
            Ok(ExploreUnusedFields {
                model_name: explore.model_name,
                explore_name: explore.explore_name,
                field_count: fields.len() as u64,
                unused_count: unused_count as u64,
                pct_unused: percentage(unused_count, fields.len())?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let worst = top_n(ratios, TOP_N, SortOrder::Descending, |e| e.pct_unused);
    Ok(Report::ExploresWithUnusedFields(ExploresWithUnusedFields::new(worst)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;
    use crate::testing::{FakeLooker, options};
    use common::Error;
    use serde_json::json;

    fn used(model: &str, explore: &str, field: &str, times: u64) -> serde_json::Value {
        json!({
            "field_usage.model": model,
            "field_usage.explore": explore,
            "field_usage.view": explore,
            "field_usage.field": field,
            "field_usage.times_used": times
        })
    }

    /// `orders` has four fields, `users` two, `empty` none.
    fn fake() -> FakeLooker {
        FakeLooker::new()
            .with_model("shop", &[("orders", false), ("users", true), ("empty", false)])
            .with_fields(
                "shop",
                "orders",
                &["orders.id", "orders.status", "orders.created"],
                &["orders.count"],
            )
            .with_fields("shop", "users", &["users.id"], &["users.count"])
            .with_fields("shop", "empty", &[], &[])
            .with_rows(
                "field_usage",
                vec![
                    used("shop", "orders", "orders.id", 80),
                    used("shop", "orders", "orders.status", 30),
                    used("shop", "orders", "orders.status", 25),
                    used("shop", "orders", "orders.created", 7),
                    used("shop", "users", "users.id", 49),
                    used("shop", "users", "users.count", 200),
                    used("other", "orders", "orders.count", 500),
                ],
            )
    }

    #[tokio::test]
    async fn test_catalog_wide_unused_fields() {
        let fake = fake();
        let report = compute_report(&fake, &options()).await.unwrap();
        let Report::UnusedFields(payload) = &report else {
            panic!("unexpected report {report:?}");
        };

        // orders.created, orders.count and users.id out of six fields.
        assert_eq!(payload.pct_unused(), 0.5);
        let sample: Vec<_> = payload
            .sample_unused_fields()
            .iter()
            .map(|f| (f.field_name.as_str(), f.times_used))
            .collect();
        assert_eq!(
            sample,
            vec![("orders.count", 0), ("orders.created", 7), ("users.id", 49)]
        );
        assert_eq!(report.grade(), Grade::Bad);

        let query = &fake.queries()[0];
        assert_eq!(query.view, "field_usage");
        assert!(query.filters.is_empty());
        assert_eq!(query.limit.as_deref(), Some("50000"));
        assert_eq!(fake.calls("explore_fields"), 3);
    }

    #[tokio::test]
    async fn test_explores_ranked_by_unused_share() {
        let report = compute_explores_report(&fake(), &options()).await.unwrap();
        let Report::ExploresWithUnusedFields(payload) = &report else {
            panic!("unexpected report {report:?}");
        };

        let ranked: Vec<_> = payload
            .explores()
            .iter()
            .map(|e| (e.explore_name.as_str(), e.field_count, e.unused_count, e.pct_unused))
            .collect();
        // Ties keep catalog order.
        assert_eq!(ranked, vec![("orders", 4, 2, 0.5), ("users", 2, 1, 0.5)]);
        assert_eq!(report.grade(), Grade::Bad);
    }

    #[test]
    fn test_usage_is_attached_per_explore() {
        let catalog = vec![
            CatalogExplore {
                model_name: "m".into(),
                explore_name: "a".into(),
                hidden: false,
            },
            CatalogExplore {
                model_name: "m".into(),
                explore_name: "b".into(),
                hidden: false,
            },
        ];
        let names = vec![vec!["x".to_string()], vec!["x".to_string(), "y".to_string()]];
        let usage = vec![UsageRecord::new(
            ("m".to_string(), "b".to_string(), "x".to_string()),
            9,
        )];

        let attached = attach_usage(catalog, names, &usage);
        let counts: Vec<Vec<u64>> = attached
            .iter()
            .map(|(_, fields)| fields.iter().map(|f| f.times_used).collect())
            .collect();
        assert_eq!(counts, vec![vec![0], vec![9, 0]]);
        assert_eq!(attached[1].1[1].explore_name, "b");
    }

    #[tokio::test]
    async fn test_no_fields_is_degenerate() {
        let fake = FakeLooker::new()
            .with_model("m", &[("empty", false)])
            .with_fields("m", "empty", &[], &[])
            .with_rows("field_usage", vec![]);

        let err = compute_report(&fake, &options()).await.unwrap_err();
        assert!(matches!(err, Error::DegenerateInput(_)));

        let report = compute_explores_report(&fake, &options()).await.unwrap();
        let Report::ExploresWithUnusedFields(payload) = report else {
            unreachable!()
        };
        assert!(payload.explores().is_empty());
    }
}
