//! PostgREST / Supabase-style HTTP backend.
//!
//! - sessions: `GET /auth/v1/user` with the session token as bearer
//! - roles: `POST /rest/v1/rpc/get_user_role_info`
//! - mappings: `GET /rest/v1/user_tenant_mapping`
//! - data: `GET /rest/v1/<relation>?schema_name=in.(...)`

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use schoolgate_core::error::{GateError, Result};
use schoolgate_core::{Identity, RoleRecord, TenantMapping};

use crate::directory::RoleSource;
use crate::identity::IdentityProvider;
use crate::query::{TenantDataSource, TenantQuery, TenantRow};

pub struct PostgrestBackend {
    http: Client,
    base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl PostgrestBackend {
    pub fn new(url: &str, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| GateError::Internal(format!("http client init failed: {e}")))?;
        Ok(Self {
            http,
            base: url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base))
            .header("apikey", &self.api_key)
    }

    fn service(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.api_key)
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
        let resp = req
            .send()
            .await
            .map_err(|e| GateError::UpstreamQuery(format!("{what}: {e}")))?;
        decode(resp, what).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GateError::UpstreamQuery(format!("{what}: {status}: {body}")));
    }
    resp.json::<T>()
        .await
        .map_err(|e| GateError::UpstreamQuery(format!("{what}: invalid json: {e}")))
}

#[async_trait]
impl IdentityProvider for PostgrestBackend {
    async fn verify_session(&self, token: &str) -> Result<Option<Identity>> {
        let resp = self
            .get("/auth/v1/user")
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GateError::UpstreamQuery(format!("auth user: {e}")))?;

        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(None);
        }
        let user: AuthUser = decode(resp, "auth user").await?;
        Ok(Some(Identity {
            user_id: user.id,
            email: user.email,
        }))
    }
}

#[async_trait]
impl RoleSource for PostgrestBackend {
    async fn lookup_role(&self, user_id: &str) -> Result<Option<RoleRecord>> {
        let req = self.service(
            self.http
                .post(format!("{}/rest/v1/rpc/get_user_role_info", self.base))
                .header("apikey", &self.api_key)
                .json(&json!({ "p_user_id": user_id })),
        );
        let rows: Vec<RoleRecord> = self.send_json(req, "get_user_role_info").await?;
        Ok(rows.into_iter().next())
    }

    async fn tenant_mappings(&self, user_id: &str) -> Result<Vec<TenantMapping>> {
        let req = self.service(self.get("/rest/v1/user_tenant_mapping").query(&[
            ("select", "schema_name,role".to_string()),
            ("user_id", format!("eq.{user_id}")),
        ]));
        self.send_json(req, "user_tenant_mapping").await
    }
}

#[async_trait]
impl TenantDataSource for PostgrestBackend {
    async fn fetch(&self, query: &TenantQuery) -> Result<Vec<TenantRow>> {
        let relation = query.relation();
        let req = self.service(
            self.get(&format!("/rest/v1/{relation}"))
                .query(&[("select", "*".to_string()), ("schema_name", query.in_filter())]),
        );
        self.send_json(req, relation.as_str()).await
    }
}
