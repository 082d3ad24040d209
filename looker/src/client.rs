use crate::api::LookerApi;
use crate::models::{
    Dashboard, ExploreFields, LookmlModel, QueryRequest, Row, User, UserDisplayName,
};
use async_trait::async_trait;
use common::config::LookerConfig;
use common::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const API_VERSION: &str = "4.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Deserialize)]
struct AccessToken {
    access_token: String,
}

/// HTTP implementation of [`LookerApi`] against the Looker 4.0 REST API.
pub struct LookerClient {
    http: rquest::Client,
    base_url: Url,
    token: String,
}

impl LookerClient {
    /// Exchanges the API3 credentials for an access token.
    pub async fn connect(config: &LookerConfig) -> Result<Self> {
        let base_url = base_url(config)?;
        let http = rquest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let login = endpoint(&base_url, &["login"])?;
        let response = http
            .post(login.as_str())
            .query(&[
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
            ])
            .send()
            .await?;
        let token: AccessToken = decode(response).await?;

        info!(base_url = %base_url, "Authenticated against Looker API");
        Ok(Self {
            http,
            base_url,
            token: token.access_token,
        })
    }

    fn authorization(&self) -> String {
        format!("token {}", self.token)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = endpoint(&self.base_url, segments)?;
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(url.as_str())
            .header("Authorization", self.authorization())
            .query(params)
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl LookerApi for LookerClient {
    async fn all_lookml_models(&self, limit: usize, offset: usize) -> Result<Vec<LookmlModel>> {
        self.get(
            &["lookml_models"],
            &[
                ("fields", "name,explores".to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    async fn all_users(&self, limit: usize, offset: usize) -> Result<Vec<User>> {
        self.get(
            &["users"],
            &[
                ("fields", "id,is_disabled,verified_looker_employee".to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    async fn user_display_name(&self, user_id: &str) -> Result<Option<String>> {
        let user: UserDisplayName = self
            .get(&["users", user_id], &[("fields", "display_name".to_string())])
            .await?;
        Ok(user.display_name.filter(|name| !name.trim().is_empty()))
    }

    async fn all_dashboards(&self) -> Result<Vec<Dashboard>> {
        self.get(&["dashboards"], &[("fields", "id,title".to_string())])
            .await
    }

    async fn run_inline_query(&self, query: &QueryRequest) -> Result<Vec<Row>> {
        let url = endpoint(&self.base_url, &["queries", "run", "json"])?;
        debug!(model = %query.model, view = %query.view, "Running inline query");
        let response = self
            .http
            .post(url.as_str())
            .header("Authorization", self.authorization())
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(query)?)
            .send()
            .await?;
        decode(response).await
    }

    async fn explore_fields(&self, model: &str, explore: &str) -> Result<ExploreFields> {
        self.get(
            &["lookml_models", model, "explores", explore],
            &[("fields", "fields".to_string())],
        )
        .await
    }
}

async fn decode<T: DeserializeOwned>(response: rquest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(Error::from_status(status.as_u16(), body));
    }
    Ok(serde_json::from_str(&body)?)
}

fn base_url(config: &LookerConfig) -> Result<Url> {
    let raw = format!("{}:{}", config.host_url.trim_end_matches('/'), config.port);
    Ok(Url::parse(&raw)?)
}

fn endpoint(base_url: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidUri(format!("{} cannot be a base URL", base_url)))?
        .pop_if_empty()
        .extend(["api", API_VERSION])
        .extend(segments);
    Ok(url)
}
