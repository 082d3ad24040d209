use crate::models::{Dashboard, ExploreFields, LookmlModel, QueryRequest, Row, User};
use async_trait::async_trait;
use common::Result;

/// The slice of the Looker API the health reports consume.
///
/// Implementations must be safe to call concurrently; reports fan out
/// per-explore lookups against a single shared client. Errors are classified
/// through [`common::Error::is_transient`] by the callers' retry policy.
#[async_trait]
pub trait LookerApi: Send + Sync {
    /// One page of LookML models with their explores.
    async fn all_lookml_models(&self, limit: usize, offset: usize) -> Result<Vec<LookmlModel>>;

    /// One page of user accounts.
    async fn all_users(&self, limit: usize, offset: usize) -> Result<Vec<User>>;

    /// Display name of one user, `None` when the account has none.
    async fn user_display_name(&self, user_id: &str) -> Result<Option<String>>;

    async fn all_dashboards(&self) -> Result<Vec<Dashboard>>;

    /// Runs an ad-hoc query and returns its rows in upstream order.
    async fn run_inline_query(&self, query: &QueryRequest) -> Result<Vec<Row>>;

    async fn explore_fields(&self, model: &str, explore: &str) -> Result<ExploreFields>;
}
