//! Mock Vault fixtures and test constants.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token the mock server accepts by default.
pub const TOKEN: &str = "s.test-token";

/// Secrets used across multiple tests.
pub const DB_SECRETS: &[(&str, &str)] = &[("db/user", "alice"), ("db/pass", "s3cr3t")];

/// Accept `token` on `auth/token/lookup-self`.
pub async fn accept_token(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", token))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": token, "policies": ["default"] }
        })))
        .mount(server)
        .await;
}

/// Reject every token on `auth/token/lookup-self`.
pub async fn reject_tokens(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })),
        )
        .mount(server)
        .await;
}

/// Serve `value` at the KV v1 path `secret/<secret>`, expecting `calls` reads.
pub async fn serve_secret(server: &MockServer, secret: &str, value: &str, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/secret/{}", secret)))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "value": value },
            "lease_duration": 2764800,
            "renewable": false
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Serve every secret in `secrets`, each expected to be read once.
pub async fn serve_secrets(server: &MockServer, secrets: &[(&str, &str)]) {
    for (secret, value) in secrets {
        serve_secret(server, secret, value, 1).await;
    }
}

/// Answer 404 for `secret/<secret>`.
pub async fn missing_secret(server: &MockServer, secret: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/secret/{}", secret)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": [] })))
        .expect(1)
        .mount(server)
        .await;
}

/// Fail the test if any secret is read.
pub async fn forbid_secret_reads(server: &MockServer) {
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/v1/secret/.*"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
