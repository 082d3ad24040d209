use common::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One result row of an inline query, keyed by fully-qualified field name.
pub type Row = Map<String, Value>;

/// Body of `POST /queries/run/json`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryRequest {
    pub model: String,
    pub view: String,
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<String>,
}

impl QueryRequest {
    pub fn new(model: &str, view: &str) -> Self {
        Self {
            model: model.to_string(),
            view: view.to_string(),
            fields: Vec::new(),
            filters: BTreeMap::new(),
            limit: None,
            sorts: Vec::new(),
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn filter(mut self, field: &str, expression: &str) -> Self {
        self.filters.insert(field.to_string(), expression.to_string());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn sort(mut self, sort: &str) -> Self {
        self.sorts.push(sort.to_string());
        self
    }
}

/// Typed accessors over a query row.
pub trait RowExt {
    /// Canonical string form of a key column; numbers are rendered without quotes.
    fn key(&self, field: &str) -> Result<String>;
    /// Like [`RowExt::key`], but `null` or a missing column yields `None`.
    fn optional_key(&self, field: &str) -> Result<Option<String>>;
    /// Non-negative integer measure; `null` or a missing column counts as zero.
    fn count(&self, field: &str) -> Result<u64>;
    /// Floating point measure; `null` or a missing column counts as zero.
    fn number(&self, field: &str) -> Result<f64>;
}

impl RowExt for Row {
    fn key(&self, field: &str) -> Result<String> {
        self.optional_key(field)?.ok_or_else(|| {
            Error::SchemaMismatch(format!("row is missing key column '{}'", field))
        })
    }

    fn optional_key(&self, field: &str) -> Result<Option<String>> {
        match self.get(field) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(Error::SchemaMismatch(format!(
                "column '{}' is not a scalar: {}",
                field, other
            ))),
        }
    }

    fn count(&self, field: &str) -> Result<u64> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| is_whole_count(*f)).map(|f| f as u64))
                .ok_or_else(|| mismatch(field, "a non-negative count")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| mismatch(field, "a non-negative count")),
            Some(_) => Err(mismatch(field, "a non-negative count")),
        }
    }

    fn number(&self, field: &str) -> Result<f64> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(0.0),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| mismatch(field, "a number")),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| mismatch(field, "a number")),
            Some(_) => Err(mismatch(field, "a number")),
        }
    }
}

/// Integral, non-negative and within `u64`; `4.0` qualifies, `2.6` does not.
fn is_whole_count(value: f64) -> bool {
    value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64
}

fn mismatch(field: &str, expected: &str) -> Error {
    Error::SchemaMismatch(format!("column '{}' is not {}", field, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let query = QueryRequest::new("system__activity", "history")
            .fields(["query.view", "query.model"])
            .filter("history.created_date", "last 90 days")
            .limit(10)
            .sort("history.average_runtime desc");

        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "system__activity",
                "view": "history",
                "fields": ["query.view", "query.model"],
                "filters": {"history.created_date": "last 90 days"},
                "limit": "10",
                "sorts": ["history.average_runtime desc"]
            })
        );
    }

    #[test]
    fn test_empty_optionals_are_omitted() {
        let body = serde_json::to_value(QueryRequest::new("m", "v")).unwrap();
        assert_eq!(body, json!({"model": "m", "view": "v", "fields": []}));
    }

    #[test]
    fn test_key_normalizes_numbers() {
        let r = row(json!({"history.user_id": 42, "query.model": "ecommerce"}));
        assert_eq!(r.key("history.user_id").unwrap(), "42");
        assert_eq!(r.key("query.model").unwrap(), "ecommerce");
        assert!(matches!(r.key("query.view"), Err(Error::SchemaMismatch(_))));
        assert_eq!(r.optional_key("query.view").unwrap(), None);

        let nested = row(json!({"dashboard.id": null, "bad": [1]}));
        assert_eq!(nested.optional_key("dashboard.id").unwrap(), None);
        assert!(matches!(nested.optional_key("bad"), Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_count_and_number() {
        let r = row(json!({
            "runs": 7,
            "nulls": null,
            "text": "12",
            "avg": 3.5,
            "negative": -1
        }));
        assert_eq!(r.count("runs").unwrap(), 7);
        assert_eq!(r.count("nulls").unwrap(), 0);
        assert_eq!(r.count("absent").unwrap(), 0);
        assert_eq!(r.count("text").unwrap(), 12);
        assert!(r.count("negative").is_err());
        assert_eq!(r.number("avg").unwrap(), 3.5);
        assert_eq!(r.number("runs").unwrap(), 7.0);
    }

    #[test]
    fn test_fractional_count_is_rejected() {
        let r = row(json!({"whole": 4.0, "fraction": 2.6, "text": "2.6"}));
        assert_eq!(r.count("whole").unwrap(), 4);
        assert!(matches!(r.count("fraction"), Err(Error::SchemaMismatch(_))));
        assert!(matches!(r.count("text"), Err(Error::SchemaMismatch(_))));
    }
}
