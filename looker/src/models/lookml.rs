use serde::Deserialize;

/// A LookML model as listed by `GET /lookml_models?fields=name,explores`.
#[derive(Debug, Clone, Deserialize)]
pub struct LookmlModel {
    pub name: Option<String>,
    pub explores: Option<Vec<LookmlExplore>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookmlExplore {
    pub name: Option<String>,
    #[serde(default)]
    pub hidden: Option<bool>,
}

/// Response of `GET /lookml_models/{model}/explores/{explore}?fields=fields`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExploreFields {
    pub fields: Option<ExploreFieldset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExploreFieldset {
    pub dimensions: Option<Vec<ExploreField>>,
    pub measures: Option<Vec<ExploreField>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExploreField {
    pub name: Option<String>,
}

impl ExploreFields {
    pub fn from_names<D, M>(dimensions: D, measures: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        let named = |name: String| ExploreField { name: Some(name) };
        Self {
            fields: Some(ExploreFieldset {
                dimensions: Some(dimensions.into_iter().map(|n| named(n.into())).collect()),
                measures: Some(measures.into_iter().map(|n| named(n.into())).collect()),
            }),
        }
    }

    /// Dimension names followed by measure names; unnamed fields are dropped.
    pub fn names(&self) -> Vec<String> {
        let Some(fieldset) = &self.fields else {
            return Vec::new();
        };

        fieldset
            .dimensions
            .iter()
            .flatten()
            .chain(fieldset.measures.iter().flatten())
            .filter_map(|field| field.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_dimensions_then_measures() {
        let raw = r#"{"fields": {
            "dimensions": [{"name": "orders.id"}, {"name": null}, {"name": "orders.status"}],
            "measures": [{"name": "orders.count"}]
        }}"#;
        let fields: ExploreFields = serde_json::from_str(raw).unwrap();
        assert_eq!(
            fields.names(),
            vec!["orders.id", "orders.status", "orders.count"]
        );
    }

    #[test]
    fn test_names_missing_sections() {
        let fields: ExploreFields =
            serde_json::from_str(r#"{"fields": {"dimensions": null}}"#).unwrap();
        assert!(fields.names().is_empty());
        assert!(ExploreFields::default().names().is_empty());
    }

    #[test]
    fn test_model_with_null_explores() {
        let raw = r#"[{"name": "ecommerce", "explores": null},
                      {"name": "marketing", "explores": [{"name": "campaigns", "hidden": true}]}]"#;
        let models: Vec<LookmlModel> = serde_json::from_str(raw).unwrap();
        assert!(models[0].explores.is_none());
        let explores = models[1].explores.as_ref().unwrap();
        assert_eq!(explores[0].hidden, Some(true));
    }
}
