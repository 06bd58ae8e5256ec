use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Algorithms accepted on decode. Anything outside the HMAC family is
/// rejected before the signature is looked at.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type to allow callers to define their own token payload.
/// Signs with HS256 and accepts any HMAC-SHA2 variant on decode.
/// Expiry is not checked here; see [`crate::tokens::TokenService`].
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it from configuration, never from code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a JWT token and verify its signature.
    ///
    /// # Errors
    /// * `InvalidSignature` - Header algorithm is not HMAC, or the signature does not verify
    /// * `Malformed` - Token structure, header or claims cannot be parsed
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let algorithm = header_algorithm(token)?;
        match algorithm.parse::<Algorithm>() {
            Ok(alg) if HMAC_ALGORITHMS.contains(&alg) => {}
            _ => {
                return Err(JwtError::InvalidSignature(format!(
                    "unexpected signing method: {}",
                    algorithm
                )))
            }
        }

        let mut validation = Validation::new(self.algorithm);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidSignature(e.to_string())
                }
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}

/// Read the `alg` field of the token header without trusting anything else.
fn header_algorithm(token: &str) -> Result<String, JwtError> {
    #[derive(Deserialize)]
    struct RawHeader {
        alg: String,
    }

    let encoded = token
        .split('.')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| JwtError::Malformed("missing header".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| JwtError::Malformed(format!("header encoding: {}", e)))?;

    serde_json::from_slice::<RawHeader>(&bytes)
        .map(|header| header.alg)
        .map_err(|e| JwtError::Malformed(format!("header: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestClaims {
        sub: String,
        role: String,
    }

    fn claims() -> TestClaims {
        TestClaims {
            sub: "user123".to_string(),
            role: "admin".to_string(),
        }
    }

    fn forge(header: &str, payload: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode("signature")
        )
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let token = handler.encode(&claims()).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded: TestClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims());
    }

    #[test]
    fn test_decode_garbage_is_malformed() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");

        let result = handler.decode::<TestClaims>("invalid.token.here");
        assert!(matches!(result, Err(JwtError::Malformed(_))));

        let result = handler.decode::<TestClaims>("");
        assert!(matches!(result, Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1.encode(&claims()).expect("Failed to encode token");

        let result = handler2.decode::<TestClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    }

    #[test]
    fn test_decode_rejects_none_algorithm() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let token = forge(
            r#"{"alg":"none","typ":"JWT"}"#,
            r#"{"sub":"user123","role":"admin"}"#,
        );

        let result = handler.decode::<TestClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    }

    #[test]
    fn test_decode_rejects_asymmetric_algorithm() {
        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let token = forge(
            r#"{"alg":"RS256","typ":"JWT"}"#,
            r#"{"sub":"user123","role":"admin"}"#,
        );

        let result = handler.decode::<TestClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature(_))));
    }

    #[test]
    fn test_decode_accepts_other_hmac_variants() {
        let secret = b"my_secret_key_at_least_32_bytes_long!";
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims(),
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let decoded: TestClaims = JwtHandler::new(secret).decode(&token).unwrap();
        assert_eq!(decoded, claims());
    }

    #[test]
    fn test_decode_unparsable_claims_is_malformed() {
        #[derive(Serialize)]
        struct Other {
            sub: String,
        }

        let handler = JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!");
        let token = handler
            .encode(&Other {
                sub: "user123".to_string(),
            })
            .unwrap();

        let result = handler.decode::<TestClaims>(&token);
        assert!(matches!(result, Err(JwtError::Malformed(_))));
    }
}
