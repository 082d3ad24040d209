use super::{FetchOptions, fetch_catalog, fetch_field_names};
use crate::models::{CatalogExplore, ExploreSize, LargeExplores, Report};
use crate::stats::{SortOrder, TOP_N, median, top_n};
use common::Result;
use looker::LookerApi;
use tracing::debug;

/// Explores with the most fields, and the median explore size.
pub async fn compute_report(api: &dyn LookerApi, options: &FetchOptions) -> Result<Report> {
    let catalog = fetch_catalog(api, options).await?;
    let field_names = fetch_field_names(api, options, &catalog).await?;
    debug!(explores = catalog.len(), "Fetched explore fields");

    let field_counts = field_names
        .iter()
        .map(|names| names.len() as u64)
        .collect();
    summarize(catalog, field_counts)
}

fn summarize(catalog: Vec<CatalogExplore>, field_counts: Vec<u64>) -> Result<Report> {
    let median_explore_size = median(&field_counts)?;

    let sizes: Vec<ExploreSize> = catalog
        .into_iter()
        .zip(field_counts)
        .map(|(explore, field_count)| ExploreSize {
            model_name: explore.model_name,
            explore_name: explore.explore_name,
            field_count,
        })
        .collect();
    let largest = top_n(sizes, TOP_N, SortOrder::Descending, |e| e.field_count as f64);

    Ok(Report::LargeExplores(LargeExplores::new(
        largest,
        median_explore_size,
    )?))
}
