use std::collections::BTreeMap;
use std::net::SocketAddr;

use serde::Deserialize;
use schoolgate_core::error::{GateError, Result};
use schoolgate_core::Role;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub routes: RoutesSection,

    /// Role -> allowed route prefixes.
    #[serde(default = "default_roles")]
    pub roles: BTreeMap<Role, Vec<String>>,

    #[serde(default)]
    pub rate_limit: RateLimitSection,

    #[serde(default)]
    pub lookups: LookupSection,

    #[serde(default)]
    pub session: SessionSection,

    #[serde(default)]
    pub backend: BackendConfig,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(GateError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.routes.validate()?;
        validate_roles(&self.roles)?;
        self.rate_limit.validate()?;
        self.lookups.validate()?;
        self.session.validate()?;
        self.backend.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            GateError::BadRequest(format!("gateway.listen must be a socket address: {e}"))
        })?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesSection {
    #[serde(default = "default_public_routes")]
    pub public: Vec<String>,

    #[serde(default = "default_protected_routes")]
    pub protected: Vec<String>,

    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self {
            public: default_public_routes(),
            protected: default_protected_routes(),
            login_path: default_login_path(),
        }
    }
}

impl RoutesSection {
    pub fn validate(&self) -> Result<()> {
        for p in self.public.iter().chain(self.protected.iter()) {
            require_absolute("routes", p)?;
        }
        require_absolute("routes.login_path", &self.login_path)?;

        if let Some(dup) = self.public.iter().find(|p| self.protected.contains(p)) {
            return Err(GateError::BadRequest(format!(
                "route prefix {dup} is listed as both public and protected"
            )));
        }
        if !self.public.iter().any(|p| self.login_path.starts_with(p.as_str())) {
            return Err(GateError::BadRequest(format!(
                "routes.login_path {} must be covered by a public route",
                self.login_path
            )));
        }
        Ok(())
    }
}

fn default_public_routes() -> Vec<String> {
    ["/login", "/auth", "/_next", "/favicon.ico"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_protected_routes() -> Vec<String> {
    ["/dashboard", "/api/dashboard", "/api/v1/dashboard"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_login_path() -> String {
    "/login".into()
}

/// Built-in permission table.
pub fn default_roles() -> BTreeMap<Role, Vec<String>> {
    let education = [
        "/dashboard",
        "/api/dashboard/presence",
        "/api/dashboard/complaints",
        "/api/dashboard/emotional",
        "/api/v1/dashboard/summary",
        "/api/v1/dashboard/events",
        "/api/v1/dashboard/schemas",
    ];
    let security = [
        "/dashboard",
        "/api/dashboard/security",
        "/api/v1/dashboard/summary",
        "/api/v1/dashboard/alerts",
        "/api/v1/dashboard/schemas",
    ];
    let to_vec = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    BTreeMap::from([
        (Role::Diretoria, to_vec(&education)),
        (Role::SecEducMun, to_vec(&education)),
        (Role::SecEducEst, to_vec(&education)),
        (Role::SecSegPub, to_vec(&security)),
    ])
}

fn validate_roles(roles: &BTreeMap<Role, Vec<String>>) -> Result<()> {
    for role in Role::ALL {
        let prefixes = roles.get(&role).ok_or_else(|| {
            GateError::BadRequest(format!("roles.{role} has no route prefixes defined"))
        })?;
        if prefixes.is_empty() {
            return Err(GateError::BadRequest(format!(
                "roles.{role} must not be empty"
            )));
        }
        for p in prefixes {
            require_absolute("roles", p)?;
        }
    }
    Ok(())
}

fn require_absolute(field: &str, p: &str) -> Result<()> {
    if !p.starts_with('/') {
        return Err(GateError::BadRequest(format!(
            "{field}: prefix {p:?} must start with '/'"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSection {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl RateLimitSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=3600).contains(&self.window_secs) {
            return Err(GateError::BadRequest(
                "rate_limit.window_secs must be between 1 and 3600".into(),
            ));
        }
        if self.max_requests == 0 {
            return Err(GateError::BadRequest(
                "rate_limit.max_requests must be at least 1".into(),
            ));
        }
        if self.sweep_interval_secs < self.window_secs {
            return Err(GateError::BadRequest(
                "rate_limit.sweep_interval_secs must not be shorter than window_secs".into(),
            ));
        }
        Ok(())
    }
}

fn default_window_secs() -> u64 {
    60
}
fn default_max_requests() -> u32 {
    100
}
fn default_sweep_interval_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupSection {
    /// Upper bound for identity and role lookups.
    #[serde(default = "default_lookup_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LookupSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_lookup_timeout_ms(),
        }
    }
}

impl LookupSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=30000).contains(&self.timeout_ms) {
            return Err(GateError::BadRequest(
                "lookups.timeout_ms must be between 100 and 30000".into(),
            ));
        }
        Ok(())
    }
}

fn default_lookup_timeout_ms() -> u64 {
    3000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    /// Cookie names that may carry the session token, in lookup order.
    #[serde(default = "default_session_cookies")]
    pub cookies: Vec<String>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookies: default_session_cookies(),
        }
    }
}

impl SessionSection {
    pub fn validate(&self) -> Result<()> {
        if self.cookies.is_empty() || self.cookies.iter().any(|c| c.trim().is_empty()) {
            return Err(GateError::BadRequest(
                "session.cookies must list at least one non-empty cookie name".into(),
            ));
        }
        Ok(())
    }
}

fn default_session_cookies() -> Vec<String> {
    vec!["sb-access-token".into()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum BackendConfig {
    /// In-process store, optionally seeded from a YAML fixtures file.
    Memory {
        #[serde(default)]
        fixtures: Option<String>,
    },
    /// PostgREST / Supabase-style HTTP backend.
    Postgrest {
        url: String,
        /// Name of the environment variable holding the service key.
        api_key_env: String,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Memory { fixtures: None }
    }
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Memory { .. } => "memory",
            BackendConfig::Postgrest { .. } => "postgrest",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            BackendConfig::Memory { .. } => Ok(()),
            BackendConfig::Postgrest { url, api_key_env } => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(GateError::BadRequest(
                        "backend.url must be an http(s) URL".into(),
                    ));
                }
                if api_key_env.trim().is_empty() {
                    return Err(GateError::BadRequest(
                        "backend.api_key_env must not be empty".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}
