use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: Option<String>,
    #[serde(default)]
    pub is_disabled: Option<bool>,
    /// Set for accounts belonging to Looker's own staff.
    #[serde(default)]
    pub verified_looker_employee: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDisplayName {
    pub display_name: Option<String>,
}
