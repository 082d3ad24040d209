use crate::models::{Report, ReportKind};
use crate::reports::{self, FetchOptions};
use common::Result;
use common::config::{LookerConfig, Settings};
use looker::{LookerApi, LookerClient};
use tracing::{Instrument, Span, info, info_span};
use uuid::Uuid;

/// Runs health checks against a Looker instance, one fresh session per run.
pub struct HealthService {
    options: FetchOptions,
}

impl HealthService {
    pub fn new(settings: &Settings) -> Self {
        Self::with_options(FetchOptions::from(settings))
    }

    pub fn with_options(options: FetchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Logs in with `config` and computes the report for `kind`.
    pub async fn run(&self, kind: ReportKind, config: &LookerConfig) -> Result<Report> {
        async {
            info!(host = %config.host_url, "Connecting to Looker");
            let client = self
                .options
                .retry
                .run(|| LookerClient::connect(config))
                .await?;
            reports::compute(kind, &client, &self.options).await
        }
        .instrument(report_span(kind))
        .await
    }

    /// Computes the report for `kind` against an already connected API.
    pub async fn run_with(&self, kind: ReportKind, api: &dyn LookerApi) -> Result<Report> {
        reports::compute(kind, api, &self.options)
            .instrument(report_span(kind))
            .await
    }
}

fn report_span(kind: ReportKind) -> Span {
    info_span!("report", test_id = kind.test_id(), run_id = %Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;
    use crate::testing::{FakeLooker, options};
    use common::Error;
    use serde_json::json;

    #[tokio::test]
    async fn test_run_with_dispatches_on_kind() {
        let service = HealthService::with_options(options());
        let fake = FakeLooker::new().with_rows(
            "history",
            vec![json!({
                "query.model": "shop",
                "query.view": "orders",
                "history.average_runtime": 12.0,
                "history.max_runtime": 30.0
            })],
        );

        let report = service.run_with(ReportKind::SlowExplores, &fake).await.unwrap();
        assert_eq!(report.kind(), ReportKind::SlowExplores);
        assert_eq!(report.grade(), Grade::Good);
    }

    #[tokio::test]
    async fn test_upstream_failures_surface_unchanged() {
        let service = HealthService::with_options(options());
        let fake = FakeLooker::new()
            .with_rows("history", vec![])
            .fail_next("run_inline_query", Error::Forbidden);

        let err = service
            .run_with(ReportKind::OverusedQueries, &fake)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden));
        assert_eq!(fake.calls("run_inline_query"), 1);
    }

    #[test]
    fn test_options_follow_settings() {
        let settings: Settings = serde_json::from_value(json!({
            "fetch": {"page_size": 25, "concurrency": 2},
            "retry": {"max_attempts": 5}
        }))
        .unwrap();

        let service = HealthService::new(&settings);
        assert_eq!(service.options().page_size, 25);
        assert_eq!(service.options().concurrency, 2);
        assert_eq!(service.options().retry.max_attempts, 5);
    }
}
