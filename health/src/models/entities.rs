use serde::Serialize;

/// (model, explore) pair identifying an explore within one catalog snapshot.
pub type ExploreKey = (String, String);

/// An explore listed in the LookML catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogExplore {
    pub model_name: String,
    pub explore_name: String,
    pub hidden: bool,
}

impl CatalogExplore {
    pub fn key(&self) -> ExploreKey {
        (self.model_name.clone(), self.explore_name.clone())
    }
}

/// A usage fact: the join key it belongs to and one measure.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord<K> {
    pub key: K,
    pub measure: u64,
}

impl<K> UsageRecord<K> {
    pub fn new(key: K, measure: u64) -> Self {
        Self { key, measure }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub is_disabled: bool,
    pub is_internal_employee: bool,
}

impl UserRecord {
    /// Customer accounts that count towards the inactive-user ratio.
    pub fn is_countable(&self) -> bool {
        !self.is_disabled && !self.is_internal_employee
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRecord {
    pub id: String,
    pub title: String,
    pub query_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExploreSize {
    pub model_name: String,
    pub explore_name: String,
    pub field_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorePerformance {
    pub model_name: String,
    pub explore_name: String,
    /// Seconds.
    pub avg_runtime: f64,
    /// Seconds.
    pub max_runtime: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExploreQueries {
    pub model_name: String,
    pub explore_name: String,
    pub query_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUsage {
    pub model_name: String,
    pub explore_name: String,
    pub field_name: String,
    pub times_used: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreUnusedFields {
    pub model_name: String,
    pub explore_name: String,
    pub field_count: u64,
    pub unused_count: u64,
    pub pct_unused: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryUsage {
    pub model_name: String,
    pub explore_name: String,
    pub query_id: String,
    pub issuer_source: String,
    pub source: String,
    pub database_run_count: u64,
}
