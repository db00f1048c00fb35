//! HS256 token issuing and verification.
//!
//! Tokens carry the session descriptor and an issuer but **no** `exp`
//! claim. Cryptographic validity never implies liveness; the session record
//! in the cache decides that.

use std::collections::HashSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use edgeguard_core::config::{AuthConfig, MIN_SIGNING_KEY_BYTES};
use edgeguard_core::error::AppError;

use super::descriptor::SessionDescriptor;
use super::error::TokenError;

/// Wire payload: the descriptor plus registered claims.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    iss: String,
    /// Issued-at, seconds since epoch.
    iat: i64,
    #[serde(flatten)]
    session: SessionDescriptor,
}

/// Only the header field we inspect before verification.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from configuration.
    ///
    /// Refuses keys shorter than 256 bits.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let secret = config.signing_key.as_bytes();
        if secret.len() < MIN_SIGNING_KEY_BYTES {
            return Err(AppError::configuration(format!(
                "Signing key must be at least {MIN_SIGNING_KEY_BYTES} bytes"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["iss".to_string()]);
        validation.set_issuer(&[config.issuer.as_str()]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
        })
    }

    /// Produce a signed compact token whose payload is the descriptor.
    pub fn issue(&self, descriptor: &SessionDescriptor) -> Result<String, AppError> {
        let claims = TokenClaims {
            iss: self.issuer.clone(),
            iat: descriptor.login_time / 1000,
            session: descriptor.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a compact token and return its descriptor.
    ///
    /// Pure computation; never touches the cache.
    pub fn verify(&self, token: &str) -> Result<SessionDescriptor, TokenError> {
        self.check_algorithm(token)?;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
                    TokenError::UnsupportedScheme
                }
                _ => TokenError::MalformedToken,
            },
        )?;

        Ok(data.claims.session)
    }

    /// Reject anything not signed with HS256 before attempting verification.
    ///
    /// Done by hand so that `alg: none` and other unknown algorithms surface
    /// as an unsupported scheme rather than a parse failure.
    fn check_algorithm(&self, token: &str) -> Result<(), TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(_), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::MalformedToken);
        };

        let raw = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::MalformedToken)?;
        let header: RawHeader =
            serde_json::from_slice(&raw).map_err(|_| TokenError::MalformedToken)?;

        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedScheme);
        }
        Ok(())
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; anything but `Bearer` is an
/// unsupported scheme.
pub fn bearer_token(header_value: &str) -> Result<&str, TokenError> {
    let (scheme, token) = header_value
        .trim_start()
        .split_once(' ')
        .ok_or(TokenError::UnsupportedScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::UnsupportedScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::MalformedToken);
    }
    Ok(token)
}
