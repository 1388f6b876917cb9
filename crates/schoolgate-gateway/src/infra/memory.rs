//! In-process backend for development and tests.
//!
//! Sessions, role records, tenant mappings and relation rows live in
//! `DashMap`s and can be seeded from a YAML fixtures file. Relations can be
//! switched to fail, and every lookup and fetch is counted.

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;

use schoolgate_core::error::{GateError, Result};
use schoolgate_core::{Identity, RoleRecord, TenantMapping};

use crate::directory::RoleSource;
use crate::identity::IdentityProvider;
use crate::query::{Relation, TenantDataSource, TenantQuery, TenantRow};

/// Seed data, keyed the way the backing tables are.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixtures {
    /// session token -> identity
    #[serde(default)]
    pub sessions: HashMap<String, Identity>,
    /// user id -> role record
    #[serde(default)]
    pub roles: HashMap<String, RoleRecord>,
    /// user id -> tenant mappings
    #[serde(default)]
    pub tenant_mappings: HashMap<String, Vec<TenantMapping>>,
    #[serde(default)]
    pub relations: HashMap<Relation, Vec<TenantRow>>,
}

#[derive(Default)]
pub struct MemoryBackend {
    sessions: DashMap<String, Identity>,
    roles: DashMap<String, RoleRecord>,
    mappings: DashMap<String, Vec<TenantMapping>>,
    relations: DashMap<Relation, Vec<TenantRow>>,
    failing: DashMap<Relation, String>,
    session_lookups: AtomicUsize,
    role_lookups: AtomicUsize,
    fetches: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        let mut this = Self::new();
        this.sessions.extend(fixtures.sessions);
        this.roles.extend(fixtures.roles);
        this.mappings.extend(fixtures.tenant_mappings);
        this.relations.extend(fixtures.relations);
        this
    }

    pub fn from_fixtures_file(path: &str) -> Result<Self> {
        let s = fs::read_to_string(path)
            .map_err(|e| GateError::Internal(format!("read fixtures failed ({path}): {e}")))?;
        let fixtures: Fixtures = serde_yaml::from_str(&s)
            .map_err(|e| GateError::BadRequest(format!("invalid fixtures yaml: {e}")))?;
        Ok(Self::from_fixtures(fixtures))
    }

    pub fn insert_session(&self, token: impl Into<String>, identity: Identity) {
        self.sessions.insert(token.into(), identity);
    }

    pub fn insert_role(&self, user_id: impl Into<String>, record: RoleRecord) {
        self.roles.insert(user_id.into(), record);
    }

    pub fn insert_mappings(&self, user_id: impl Into<String>, rows: Vec<TenantMapping>) {
        self.mappings.insert(user_id.into(), rows);
    }

    pub fn insert_rows(&self, relation: Relation, rows: Vec<TenantRow>) {
        self.relations.entry(relation).or_default().extend(rows);
    }

    /// Make every fetch against `relation` fail with `message`.
    pub fn fail_relation(&self, relation: Relation, message: impl Into<String>) {
        self.failing.insert(relation, message.into());
    }

    pub fn session_lookups(&self) -> usize {
        self.session_lookups.load(Ordering::SeqCst)
    }

    pub fn role_lookups(&self) -> usize {
        self.role_lookups.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn verify_session(&self, token: &str) -> Result<Option<Identity>> {
        self.session_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.sessions.get(token).map(|e| e.value().clone()))
    }
}

#[async_trait]
impl RoleSource for MemoryBackend {
    async fn lookup_role(&self, user_id: &str) -> Result<Option<RoleRecord>> {
        self.role_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.roles.get(user_id).map(|e| e.value().clone()))
    }

    async fn tenant_mappings(&self, user_id: &str) -> Result<Vec<TenantMapping>> {
        Ok(self
            .mappings
            .get(user_id)
            .map(|e| e.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl TenantDataSource for MemoryBackend {
    async fn fetch(&self, query: &TenantQuery) -> Result<Vec<TenantRow>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(msg) = self.failing.get(&query.relation()) {
            return Err(GateError::UpstreamQuery(msg.value().clone()));
        }

        Ok(self
            .relations
            .get(&query.relation())
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default())
    }
}
