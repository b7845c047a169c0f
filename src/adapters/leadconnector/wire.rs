//! LeadConnector wire types.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::integration::IssuedTokens;

/// Body of a successful `/oauth/token` call, for either grant type.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
    pub scope: Option<String>,
    #[serde(rename = "userType")]
    pub user_type: Option<String>,
    #[serde(rename = "locationId")]
    pub location_id: Option<String>,
    #[serde(rename = "companyId")]
    pub company_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl TokenResponse {
    /// The token part, dropping the authorization context.
    pub fn tokens(&self) -> IssuedTokens {
        IssuedTokens {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            token_type: self.token_type.clone(),
            expires_in: self.expires_in,
            scope: self.scope.clone(),
        }
    }
}

/// Best human-readable message from an error body.
///
/// Prefers `error`, then `message` (string or list), then the raw text.
pub fn upstream_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => return Some(trimmed.to_string()),
    };

    for key in ["error", "message"] {
        match parsed.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Array(items)) if !items.is_empty() => {
                let joined: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                return Some(joined.join("; "));
            }
            _ => {}
        }
    }

    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_reads_context_fields() {
        let body = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "token_type": "Bearer",
            "expires_in": 86399,
            "scope": "payments/custom-provider.write",
            "userType": "Location",
            "locationId": "loc_1",
            "companyId": "comp_1",
            "userId": "user_1"
        }"#;
        let parsed: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.location_id.as_deref(), Some("loc_1"));
        assert_eq!(parsed.company_id.as_deref(), Some("comp_1"));
        assert_eq!(parsed.tokens().expires_in, 86399);
    }

    #[test]
    fn upstream_message_prefers_error_field() {
        let body = r#"{"error":"invalid_grant","message":"ignored"}"#;
        assert_eq!(upstream_message(body).as_deref(), Some("invalid_grant"));
    }

    #[test]
    fn upstream_message_joins_message_lists() {
        let body = r#"{"message":["apiKey must be a string","live should not be empty"]}"#;
        assert_eq!(
            upstream_message(body).as_deref(),
            Some("apiKey must be a string; live should not be empty")
        );
    }

    #[test]
    fn upstream_message_falls_back_to_raw_text() {
        assert_eq!(upstream_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(upstream_message("   "), None);
    }
}
