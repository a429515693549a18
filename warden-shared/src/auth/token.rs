/// Bearer token issuance and verification
///
/// Tokens are compact JWTs signed with HS256 (HMAC-SHA256). They are
/// stateless: nothing is stored server-side, so validity is decided entirely
/// by the signature and the `exp` claim at verification time.
///
/// # Claims
///
/// - `sub`: Subject (username)
/// - `exp`: Expiration (Unix timestamp, seconds)
///
/// No other claim is required.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use warden_shared::auth::token::TokenCodec;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("test-secret-key-at-least-32-bytes-long");
///
/// let token = codec.issue("alice", Duration::minutes(30))?;
/// assert_eq!(codec.verify(&token)?, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default token lifetime: 30 minutes
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// A well-formed HS256 signature segment (32 zero bytes) that never matches
const ZERO_SIGNATURE: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Error type for token operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Signature does not match the payload under our key
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token expiry is in the past
    #[error("Token has expired")]
    Expired,

    /// Token could not be parsed
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Failed to encode and sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),
}

/// JWT claims carried by a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims that expire `ttl` from now
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if the expiry falls outside the
    /// representable date range
    pub fn new(subject: impl Into<String>, ttl: Duration) -> Result<Self, TokenError> {
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            TokenError::CreateError(format!("Token lifetime out of range: {}", ttl))
        })?;

        Ok(Self {
            sub: subject.into(),
            exp: expires_at.timestamp(),
        })
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Signs and verifies bearer tokens with a process-wide secret
///
/// The secret is turned into keys once and shared behind an `Arc`, so
/// cloning the codec into every request is cheap.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<Keys>,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec for the given signing secret
    ///
    /// The secret should be at least 32 bytes of random data; enforcing that
    /// is the configuration layer's job.
    pub fn new(secret: &str) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            default_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    /// Sets the lifetime used by [`TokenCodec::issue_default`]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Lifetime used by [`TokenCodec::issue_default`]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issues a signed token for `subject` that expires after `ttl`
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if `ttl` overflows the date range or
    /// encoding fails
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims::new(subject, ttl)?;
        self.sign(&claims)
    }

    /// Issues a signed token using the configured default lifetime
    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.default_ttl)
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys.encoding)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its subject
    ///
    /// # Errors
    ///
    /// - `TokenError::InvalidSignature` if the signature does not match, or
    ///   the token was signed with another algorithm
    /// - `TokenError::Expired` if the current time has reached `exp`
    /// - `TokenError::MalformedToken` if the token cannot be parsed or lacks
    ///   `sub`/`exp`
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below without leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = match decode::<Claims>(token, &self.keys.decoding, &validation) {
            Ok(data) => data,
            Err(e) if matches!(e.kind(), ErrorKind::Base64(_))
                && self.only_signature_undecodable(token, &validation) =>
            {
                return Err(TokenError::InvalidSignature);
            }
            Err(e) => {
                return Err(match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::InvalidSignature
                    }
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::MalformedToken(e.to_string()),
                })
            }
        };

        if token_data.claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims.sub)
    }

    /// True when the header and payload are sound and the base64 failure
    /// came from the signature segment
    ///
    /// The last character of an HS256 signature carries padding bits, so a
    /// single edited character can make the segment undecodable rather than
    /// merely wrong.
    fn only_signature_undecodable(&self, token: &str, validation: &Validation) -> bool {
        let Some((message, _)) = token.rsplit_once('.') else {
            return false;
        };

        let substitute = format!("{}.{}", message, ZERO_SIGNATURE);
        matches!(
            decode::<Claims>(&substitute, &self.keys.decoding, validation)
                .map_err(|e| e.into_kind()),
            Err(ErrorKind::InvalidSignature)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn replace_signature_char(token: &str, index: usize, replacement: char) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[index] = replacement;
        format!("{}.{}", head, chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = TokenCodec::new(SECRET);

        let token = codec.issue("alice", Duration::minutes(30)).expect("Should issue token");
        assert_eq!(token.split('.').count(), 3);

        let subject = codec.verify(&token).expect("Should verify token");
        assert_eq!(subject, "alice");
    }

    #[test]
    fn test_default_ttl() {
        let codec = TokenCodec::new(SECRET);
        assert_eq!(codec.default_ttl(), Duration::minutes(30));

        let codec = codec.with_ttl(Duration::minutes(5));
        assert_eq!(codec.default_ttl(), Duration::minutes(5));

        let token = codec.issue_default("bob").unwrap();
        assert_eq!(codec.verify(&token).unwrap(), "bob");
    }

    #[test]
    fn test_claims_expiry() {
        let claims = Claims::new("alice", Duration::hours(1)).unwrap();
        assert!(!claims.is_expired());
        assert!(claims.exp - Utc::now().timestamp() > 3500);

        let claims = Claims::new("alice", Duration::seconds(-1)).unwrap();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("alice", Duration::zero()).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_verify_expired_token() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("alice", Duration::seconds(-3600)).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = TokenCodec::new("another-secret-key-at-least-32-bytes")
            .issue("alice", Duration::minutes(30))
            .unwrap();

        let result = TokenCodec::new(SECRET).verify(&token);
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_signature() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("alice", Duration::minutes(30)).unwrap();

        let signature_len = token.rsplit('.').next().unwrap().len();
        assert_eq!(signature_len, 43);

        for index in 0..signature_len {
            for replacement in ['A', 'B', 'Q', 'g', 'w', '_'] {
                let tampered = replace_signature_char(&token, index, replacement);
                if tampered == token {
                    continue;
                }
                assert_eq!(
                    codec.verify(&tampered),
                    Err(TokenError::InvalidSignature),
                    "index {} replaced with '{}'",
                    index,
                    replacement
                );
            }
        }
    }

    #[test]
    fn test_undecodable_header_is_still_malformed() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("alice", Duration::minutes(30)).unwrap();
        let (_, rest) = token.split_once('.').unwrap();

        let result = codec.verify(&format!("!!!.{}", rest));
        assert!(matches!(result, Err(TokenError::MalformedToken(_))));
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        let codec = TokenCodec::new(SECRET);

        let result = codec.issue("alice", Duration::minutes(1_000_000_000_000));
        assert!(matches!(result, Err(TokenError::CreateError(_))));

        let result = codec
            .with_ttl(Duration::minutes(1_000_000_000_000))
            .issue_default("alice");
        assert!(matches!(result, Err(TokenError::CreateError(_))));
    }

    #[test]
    fn test_tampered_payload() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue("alice", Duration::minutes(30)).unwrap();
        let forged_payload = codec
            .issue("mallory", Duration::minutes(30))
            .unwrap()
            .split('.')
            .nth(1)
            .unwrap()
            .to_string();

        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(codec.verify(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = TokenCodec::new(SECRET);

        for garbage in ["", "not-a-token", "a.b", "a.b.c", "a.b.c.d"] {
            let result = codec.verify(garbage);
            assert!(
                matches!(result, Err(TokenError::MalformedToken(_))),
                "'{}' should be malformed, got {:?}",
                garbage,
                result
            );
        }
    }

    #[test]
    fn test_missing_subject_is_malformed() {
        #[derive(Serialize)]
        struct NoSubject {
            exp: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSubject {
                exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = TokenCodec::new(SECRET).verify(&token);
        assert!(matches!(result, Err(TokenError::MalformedToken(_))));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = Claims::new("alice", Duration::minutes(5)).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = TokenCodec::new(SECRET).verify(&token);
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let codec = TokenCodec::new(SECRET);
        let debug = format!("{:?}", codec);
        assert!(!debug.contains(SECRET));
    }
}
