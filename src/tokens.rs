use crate::errors::AppError;
use crate::settings::Auth;
use josekit::jws::{JwsHeader, HS256};
use josekit::jwt::{self, JwtPayload, JwtPayloadValidator};
use std::time::{Duration, SystemTime};

/// Claims carried by a verified access token.
#[derive(Clone, Debug)]
pub struct Claims {
    pub subject: String,
}

/// Issues and verifies HS256 access tokens. Stateless: a pure function of
/// the configured secret and the clock; nothing is persisted server-side.
#[derive(Clone)]
pub struct TokenSigner {
    cfg: Auth,
}

impl TokenSigner {
    pub fn new(cfg: Auth) -> Self {
        Self { cfg }
    }

    /// Token lifetime configured for this signer.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cfg.token_ttl_secs)
    }

    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        let now = SystemTime::now();

        let mut payload = JwtPayload::new();
        payload.set_subject(subject);
        payload.set_issued_at(&now);
        payload.set_expires_at(&(now + ttl));

        let signer = HS256.signer_from_bytes(self.cfg.secret_key.as_bytes())?;
        let mut header = JwsHeader::new();
        header.set_token_type("JWT");

        let token = jwt::encode_with_signer(&payload, &header, &signer)?;
        Ok(token)
    }

    /// Decode and check a bearer token. Bad signature, malformed input,
    /// a past expiry, and a missing subject all fail the same way.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let verifier = HS256
            .verifier_from_bytes(self.cfg.secret_key.as_bytes())
            .map_err(|e| AppError::Jose(e.to_string()))?;

        let (payload, _header) = jwt::decode_with_verifier(token, &verifier)
            .map_err(|_| AppError::Unauthenticated("invalid or expired token".to_string()))?;

        if payload.expires_at().is_none() {
            return Err(AppError::Unauthenticated(
                "invalid or expired token".to_string(),
            ));
        }

        let mut validator = JwtPayloadValidator::new();
        validator.set_base_time(SystemTime::now());
        validator
            .validate(&payload)
            .map_err(|_| AppError::Unauthenticated("invalid or expired token".to_string()))?;

        let subject = payload
            .subject()
            .ok_or_else(|| AppError::Unauthenticated("token missing subject".to_string()))?;

        Ok(Claims {
            subject: subject.to_string(),
        })
    }
}
