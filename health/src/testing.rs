//! In-memory `LookerApi` used by the report tests.

use crate::reports::FetchOptions;
use async_trait::async_trait;
use common::{Error, Result};
use looker::models::{
    Dashboard, ExploreFields, LookmlExplore, LookmlModel, QueryRequest, Row, User,
};
use looker::{LookerApi, RetryPolicy};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Fetch options with millisecond backoff so retry paths stay fast.
pub fn options() -> FetchOptions {
    FetchOptions {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            jitter: false,
        },
        page_size: 100,
        concurrency: 4,
    }
}

#[derive(Default)]
pub struct FakeLooker {
    models: Vec<LookmlModel>,
    users: Vec<User>,
    display_names: HashMap<String, String>,
    dashboards: Vec<Dashboard>,
    rows: HashMap<String, Vec<Row>>,
    fields: HashMap<(String, String), ExploreFields>,
    failures: Mutex<HashMap<&'static str, VecDeque<Error>>>,
    calls: Mutex<Vec<&'static str>>,
    queries: Mutex<Vec<QueryRequest>>,
}

impl FakeLooker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, name: &str, explores: &[(&str, bool)]) -> Self {
        self.models.push(LookmlModel {
            name: Some(name.to_string()),
            explores: Some(
                explores
                    .iter()
                    .map(|(explore, hidden)| LookmlExplore {
                        name: Some(explore.to_string()),
                        hidden: Some(*hidden),
                    })
                    .collect(),
            ),
        });
        self
    }

    pub fn with_unnamed_model(mut self) -> Self {
        self.models.push(LookmlModel {
            name: None,
            explores: Some(vec![LookmlExplore {
                name: Some("orphan".into()),
                hidden: None,
            }]),
        });
        self
    }

    pub fn with_user(mut self, id: &str, is_disabled: bool, is_employee: bool) -> Self {
        self.users.push(User {
            id: Some(id.to_string()),
            is_disabled: Some(is_disabled),
            verified_looker_employee: Some(is_employee),
        });
        self
    }

    pub fn with_display_name(mut self, id: &str, name: &str) -> Self {
        self.display_names.insert(id.to_string(), name.to_string());
        self
    }

    pub fn with_dashboard(mut self, id: &str, title: &str) -> Self {
        self.dashboards.push(Dashboard {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
        });
        self
    }

    /// Rows returned by any inline query against `view`.
    pub fn with_rows(mut self, view: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| row.as_object().cloned())
            .collect();
        self.rows.insert(view.to_string(), rows);
        self
    }

    pub fn with_fields(
        mut self,
        model: &str,
        explore: &str,
        dimensions: &[&str],
        measures: &[&str],
    ) -> Self {
        self.fields.insert(
            (model.to_string(), explore.to_string()),
            ExploreFields::from_names(dimensions.iter().copied(), measures.iter().copied()),
        );
        self
    }

    /// Makes the next call to `operation` fail with `error`; queued failures pile up.
    pub fn fail_next(self, operation: &'static str, error: Error) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .push_back(error);
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub fn queries(&self) -> Vec<QueryRequest> {
        self.queries.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(operation);
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn page<T: Clone>(items: &[T], limit: usize, offset: usize) -> Vec<T> {
    items.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl LookerApi for FakeLooker {
    async fn all_lookml_models(&self, limit: usize, offset: usize) -> Result<Vec<LookmlModel>> {
        self.record("all_lookml_models")?;
        Ok(page(&self.models, limit, offset))
    }

    async fn all_users(&self, limit: usize, offset: usize) -> Result<Vec<User>> {
        self.record("all_users")?;
        Ok(page(&self.users, limit, offset))
    }

    async fn user_display_name(&self, user_id: &str) -> Result<Option<String>> {
        self.record("user_display_name")?;
        Ok(self.display_names.get(user_id).cloned())
    }

    async fn all_dashboards(&self) -> Result<Vec<Dashboard>> {
        self.record("all_dashboards")?;
        Ok(self.dashboards.clone())
    }

    async fn run_inline_query(&self, query: &QueryRequest) -> Result<Vec<Row>> {
        self.record("run_inline_query")?;
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.rows.get(&query.view).cloned().unwrap_or_default())
    }

    async fn explore_fields(&self, model: &str, explore: &str) -> Result<ExploreFields> {
        self.record("explore_fields")?;
        self.fields
            .get(&(model.to_string(), explore.to_string()))
            .cloned()
            .ok_or_else(|| Error::from_status(404, format!("no explore {}.{}", model, explore)))
    }
}
