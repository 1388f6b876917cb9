//! Response security headers and forwarded identity headers.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use schoolgate_core::Principal;

pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
pub const X_USER_ROLE: HeaderName = HeaderName::from_static("x-user-role");
pub const X_USER_EMAIL: HeaderName = HeaderName::from_static("x-user-email");
pub const X_USER_SCHEMAS: HeaderName = HeaderName::from_static("x-user-schemas");

const IDENTITY_HEADERS: [HeaderName; 4] = [X_USER_ID, X_USER_ROLE, X_USER_EMAIL, X_USER_SCHEMAS];

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' 'unsafe-eval' 'unsafe-inline'; \
style-src 'self' 'unsafe-inline'; \
img-src 'self' data: https:; \
font-src 'self' data:; \
connect-src 'self' https://*.supabase.co wss://*.supabase.co;";

/// The fixed header set present on every response.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("content-security-policy", CONTENT_SECURITY_POLICY),
];

pub fn apply_security_headers(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

/// Remove identity headers so only the gateway can set them.
pub fn strip_identity_headers(headers: &mut HeaderMap) {
    for name in IDENTITY_HEADERS {
        headers.remove(name);
    }
}

/// Attach the resolved identity for downstream handlers.
/// Values that are not valid header text are skipped.
pub fn attach_identity(headers: &mut HeaderMap, principal: &Principal) {
    let schemas = serde_json::to_string(&principal.entitlement).unwrap_or_else(|_| "[]".into());
    let pairs = [
        (X_USER_ID, principal.id.as_str()),
        (X_USER_ROLE, principal.role.as_str()),
        (X_USER_EMAIL, principal.email.as_str()),
        (X_USER_SCHEMAS, schemas.as_str()),
    ];
    for (name, value) in pairs {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(_) => tracing::warn!(header = %name, user_id = %principal.id, "identity header value not representable"),
        }
    }
}
