//! Caller identity for app requests.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use idv_types::UserId;

use crate::RpcError;

/// Resolves the `Authorization` header of an app request to a user.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, authorization: &str) -> Result<UserId, RpcError>;
}

/// Reads the `sub` claim of a bearer JWT.
///
/// The API gateway in front of this service has already verified the
/// token's signature and expiry; this only extracts the subject.
#[derive(Clone, Copy, Debug, Default)]
pub struct GatewayJwtAuthenticator;

impl Authenticator for GatewayJwtAuthenticator {
    fn authenticate(&self, authorization: &str) -> Result<UserId, RpcError> {
        let token = authorization
            .strip_prefix("Bearer ")
            .or_else(|| authorization.strip_prefix("bearer "))
            .unwrap_or(authorization)
            .trim();

        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| RpcError::Authentication("Malformed token".into()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| RpcError::Authentication("Malformed token".into()))?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|_| RpcError::Authentication("Malformed token".into()))?;

        let sub = claims
            .get("sub")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| RpcError::Authentication("Unauthorized".into()))?;
        UserId::new(sub).map_err(|_| RpcError::Authentication("Unauthorized".into()))
    }
}

#[cfg(test)]
pub(crate) fn test_token(sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}","role":"authenticated"}}"#));
    format!("Bearer {header}.{claims}.signature")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_subject() {
        let user = GatewayJwtAuthenticator
            .authenticate(&test_token("u-42"))
            .unwrap();
        assert_eq!(user.as_str(), "u-42");
    }

    #[test]
    fn rejects_garbage() {
        for header in ["Bearer", "Bearer abc", "Bearer a.!!!.c"] {
            assert!(matches!(
                GatewayJwtAuthenticator.authenticate(header),
                Err(RpcError::Authentication(_))
            ));
        }
    }

    #[test]
    fn rejects_token_without_subject() {
        let claims = URL_SAFE_NO_PAD.encode(br#"{"role":"anon"}"#);
        let header = format!("Bearer x.{claims}.y");
        assert!(GatewayJwtAuthenticator.authenticate(&header).is_err());
    }
}
