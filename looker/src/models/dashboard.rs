use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Dashboard {
    pub id: Option<String>,
    pub title: Option<String>,
}
