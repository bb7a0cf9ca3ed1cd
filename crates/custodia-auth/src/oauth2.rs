//! OAuth 2.0 authorization server metadata (RFC 8414).
//!
//! Pure data: no authorization-code flow, PKCE verification, or client
//! registry is implemented behind this document — it only advertises
//! what the token endpoints support.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationServerMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub response_types_supported: Vec<&'static str>,
    pub grant_types_supported: Vec<&'static str>,
    pub token_endpoint_auth_methods_supported: Vec<&'static str>,
    pub scopes_supported: Vec<&'static str>,
    pub code_challenge_methods_supported: Vec<&'static str>,
    pub revocation_endpoint: String,
    pub revocation_endpoint_auth_methods_supported: Vec<&'static str>,
}

/// Build the discovery document for a deployment rooted at `base_url`.
pub fn authorization_server_metadata(base_url: &str) -> AuthorizationServerMetadata {
    AuthorizationServerMetadata {
        issuer: base_url.to_string(),
        authorization_endpoint: format!("{base_url}/auth/authorize"),
        token_endpoint: format!("{base_url}/auth/token"),
        response_types_supported: vec!["code"],
        grant_types_supported: vec!["authorization_code", "refresh_token"],
        token_endpoint_auth_methods_supported: vec![
            "client_secret_post",
            "client_secret_basic",
            "none",
        ],
        scopes_supported: vec!["openid", "profile", "email"],
        code_challenge_methods_supported: vec!["S256"],
        revocation_endpoint: format!("{base_url}/auth/revoke"),
        revocation_endpoint_auth_methods_supported: vec![
            "client_secret_post",
            "client_secret_basic",
            "none",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_rooted_at_base_url() {
        let meta = authorization_server_metadata("https://auth.example.com");
        assert_eq!(meta.issuer, "https://auth.example.com");
        assert_eq!(meta.token_endpoint, "https://auth.example.com/auth/token");
        assert_eq!(
            meta.revocation_endpoint,
            "https://auth.example.com/auth/revoke"
        );
    }

    #[test]
    fn pkce_is_s256_only() {
        let meta = authorization_server_metadata("https://auth.example.com");
        assert_eq!(meta.code_challenge_methods_supported, vec!["S256"]);
    }

    #[test]
    fn serializes_to_rfc8414_field_names() {
        let meta = authorization_server_metadata("https://auth.example.com");
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("grant_types_supported").is_some());
        assert!(json.get("scopes_supported").is_some());
        assert_eq!(json["response_types_supported"][0], "code");
    }
}
