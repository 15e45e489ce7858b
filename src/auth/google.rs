use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Claims returned by Google's tokeninfo endpoint for a valid ID token.
/// The endpoint itself checks the signature and expiry; we still check
/// the audience against our own client id.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub aud: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Identity asserted by the external provider.
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    pub email: String,
    pub name: String,
}

/// Seam for federated sign-in, faked in tests.
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> anyhow::Result<GoogleProfile>;
}

pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
}

impl GoogleVerifier {
    pub fn new(client_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.to_string(),
        }
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> anyhow::Result<GoogleProfile> {
        let resp = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            warn!(%status, "google tokeninfo rejected id token");
            anyhow::bail!("tokeninfo returned {status}");
        }

        let claims: GoogleClaims = resp.json().await?;
        check_claims(claims, &self.client_id)
    }
}

/// Audience and payload checks, kept separate from the HTTP call.
fn check_claims(claims: GoogleClaims, client_id: &str) -> anyhow::Result<GoogleProfile> {
    if claims.aud != client_id {
        anyhow::bail!("id token audience mismatch");
    }
    if claims.email.is_empty() {
        anyhow::bail!("id token carries no email");
    }
    let name = if claims.name.is_empty() {
        // Fall back to the mailbox name when Google sends no display name.
        claims
            .email
            .split('@')
            .next()
            .unwrap_or(&claims.email)
            .to_string()
    } else {
        claims.name
    };
    Ok(GoogleProfile {
        email: claims.email,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(aud: &str, email: &str, name: &str) -> GoogleClaims {
        GoogleClaims {
            aud: aud.into(),
            email: email.into(),
            name: name.into(),
        }
    }

    #[test]
    fn accepts_matching_audience() {
        let profile = check_claims(claims("client-1", "a@x.com", "A"), "client-1").unwrap();
        assert_eq!(profile.email, "a@x.com");
        assert_eq!(profile.name, "A");
    }

    #[test]
    fn rejects_foreign_audience() {
        let err = check_claims(claims("client-2", "a@x.com", "A"), "client-1").unwrap_err();
        assert!(err.to_string().contains("audience"));
    }

    #[test]
    fn rejects_missing_email() {
        assert!(check_claims(claims("client-1", "", "A"), "client-1").is_err());
    }

    #[test]
    fn name_falls_back_to_mailbox() {
        let profile = check_claims(claims("client-1", "ada@x.com", ""), "client-1").unwrap();
        assert_eq!(profile.name, "ada");
    }
}
