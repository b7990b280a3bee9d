//! Proxy authentication.
//!
//! Basic auth against a single static credential. Authentication is
//! opt-in: with no credential configured every request passes. The
//! outcome category is logged at debug level; decode failures are
//! contained here and never escape as panics.

use crate::config::Credential;
use crate::error::{ProxyError, Result};
use crate::http::RequestHead;
use base64::{engine::general_purpose, Engine as _};
use tracing::debug;

/// Gate an inbound request. Returns `true` to proceed.
pub fn authorize(credential: Option<&Credential>, req: &RequestHead) -> bool {
    let Some(credential) = credential else {
        return true;
    };
    match verify(credential, req.header("proxy-authorization")) {
        Ok(()) => {
            debug!("proxy auth accepted");
            true
        }
        Err(e) => {
            debug!(error = %e, "proxy auth rejected");
            false
        }
    }
}

fn verify(credential: &Credential, header: Option<&str>) -> Result<()> {
    let header = header.ok_or(ProxyError::AuthMissing)?;

    let (scheme, payload) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| ProxyError::AuthMalformed("missing credential payload".into()))?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(ProxyError::AuthMalformed(format!(
            "unsupported scheme: {scheme}"
        )));
    }

    let decoded = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ProxyError::AuthMalformed(format!("invalid base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| ProxyError::AuthMalformed("credentials are not valid UTF-8".into()))?;

    // Split on the first colon only; passwords may contain colons.
    let (user, pass) = decoded
        .split_once(':')
        .ok_or_else(|| ProxyError::AuthMalformed("missing ':' separator".into()))?;

    if user == credential.username && pass == credential.password {
        Ok(())
    } else {
        Err(ProxyError::AuthRejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req_with(header: Option<&str>) -> RequestHead {
        let mut headers = vec![("Host".to_string(), "example.com".to_string())];
        if let Some(v) = header {
            headers.push(("Proxy-Authorization".to_string(), v.to_string()));
        }
        RequestHead {
            method: "GET".into(),
            target: "/".into(),
            version: "HTTP/1.1".into(),
            headers,
            leftover: Vec::new(),
        }
    }

    fn cred() -> Credential {
        Credential {
            username: "alice".into(),
            password: "wonderland".into(),
        }
    }

    fn basic(user_pass: &str) -> String {
        format!("Basic {}", general_purpose::STANDARD.encode(user_pass))
    }

    #[test]
    fn test_no_credential_accepts_everything() {
        assert!(authorize(None, &req_with(None)));
        assert!(authorize(None, &req_with(Some("Basic !!not-base64!!"))));
    }

    #[test]
    fn test_missing_header_rejected() {
        assert!(!authorize(Some(&cred()), &req_with(None)));
        assert!(matches!(
            verify(&cred(), None),
            Err(ProxyError::AuthMissing)
        ));
    }

    #[test]
    fn test_malformed_header_rejected() {
        for bad in ["Basic !!not-base64!!", "Basic", "Bearer abc", "Basic YWxpY2U="] {
            // The last one decodes to "alice" with no colon.
            assert!(!authorize(Some(&cred()), &req_with(Some(bad))), "{bad}");
        }
        assert!(matches!(
            verify(&cred(), Some("Basic !!not-base64!!")),
            Err(ProxyError::AuthMalformed(_))
        ));
    }

    #[test]
    fn test_matching_credentials_accepted() {
        assert!(authorize(Some(&cred()), &req_with(Some(&basic("alice:wonderland")))));
    }

    #[test]
    fn test_wrong_credentials_rejected() {
        assert!(!authorize(Some(&cred()), &req_with(Some(&basic("alice:hatter")))));
        assert!(!authorize(Some(&cred()), &req_with(Some(&basic("bob:wonderland")))));
        assert!(matches!(
            verify(&cred(), Some(&basic("bob:wonderland"))),
            Err(ProxyError::AuthRejected)
        ));
    }

    #[test]
    fn test_password_may_contain_colons() {
        let cred = Credential {
            username: "alice".into(),
            password: "a:b:c".into(),
        };
        assert!(verify(&cred, Some(&basic("alice:a:b:c"))).is_ok());
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert!(verify(&cred(), Some(&format!(
            "basic {}",
            general_purpose::STANDARD.encode("alice:wonderland")
        )))
        .is_ok());
    }
}
