//! HS256 JSON Web Tokens.
//!
//! Claims are `{"sub": <user id>, "exp": <unix seconds>}`. Expiry is checked
//! against the injected clock rather than the system time, so the library's
//! own `exp` validation is switched off and only the claim's presence is
//! required.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use rand::RngCore as _;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{IssuedToken, TokenCodec, TokenCodecError};
use crate::domain::{BearerToken, TokenClaims, UserId};

/// Length of keys generated by [`JwtTokenCodec::ephemeral`].
pub const EPHEMERAL_KEY_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and verifies signed tokens with a fixed lifetime.
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    pub fn new(key: Vec<u8>, ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        let key = Zeroizing::new(key);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(&key),
            decoding: DecodingKey::from_secret(&key),
            validation,
            ttl,
            clock,
        }
    }

    /// Codec with a random per-process key. Tokens do not survive restarts.
    pub fn ephemeral(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        let mut key = vec![0_u8; EPHEMERAL_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(key, ttl, clock)
    }
}

impl fmt::Debug for JwtTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenCodec")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn map_decode_error(err: &jsonwebtoken::errors::Error) -> TokenCodecError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenCodecError::bad_signature(),
        ErrorKind::ExpiredSignature => TokenCodecError::expired(),
        _ => TokenCodecError::malformed(err.to_string()),
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, subject: &UserId) -> Result<IssuedToken, TokenCodecError> {
        let expires_at = self
            .clock
            .utc()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenCodecError::issue("expiry out of range"))?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenCodecError::issue(err.to_string()))?;

        Ok(IssuedToken {
            token: BearerToken::new(token),
            expires_at: DateTime::<Utc>::from_timestamp(claims.exp, 0)
                .ok_or_else(|| TokenCodecError::issue("expiry out of range"))?,
        })
    }

    fn verify(&self, token: &BearerToken) -> Result<TokenClaims, TokenCodecError> {
        let Claims { sub, exp } =
            jsonwebtoken::decode::<Claims>(token.expose(), &self.decoding, &self.validation)
                .map_err(|err| map_decode_error(&err))?
                .claims;

        if exp <= self.clock.utc().timestamp() {
            return Err(TokenCodecError::expired());
        }
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| TokenCodecError::malformed("expiry out of range"))?;
        let subject =
            UserId::new(&sub).map_err(|err| TokenCodecError::malformed(err.to_string()))?;

        Ok(TokenClaims {
            subject,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        fn advance(&self, by: TimeDelta) {
            let mut now = self.0.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().expect("clock lock")
        }
    }

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        Arc::new(MutableClock(Mutex::new(start)))
    }

    fn codec(clock: &Arc<MutableClock>) -> JwtTokenCodec {
        JwtTokenCodec::new(vec![7; 32], TimeDelta::hours(1), clock.clone())
    }

    fn segments(token: &BearerToken) -> Vec<String> {
        token.expose().split('.').map(str::to_owned).collect()
    }

    #[rstest]
    fn issued_tokens_verify_to_their_subject(clock: Arc<MutableClock>) {
        let codec = codec(&clock);
        let subject = UserId::random();
        let issued = codec.issue(&subject).expect("issue");

        let claims = codec.verify(&issued.token).expect("verify");
        assert_eq!(claims.subject, subject);
        assert_eq!(claims.expires_at, issued.expires_at);
        assert_eq!(issued.expires_at, clock.utc() + TimeDelta::hours(1));
        assert_eq!(segments(&issued.token).len(), 3);
    }

    #[rstest]
    fn tokens_expire_at_their_deadline(clock: Arc<MutableClock>) {
        let codec = codec(&clock);
        let issued = codec.issue(&UserId::random()).expect("issue");

        clock.advance(TimeDelta::minutes(59));
        assert!(codec.verify(&issued.token).is_ok());
        clock.advance(TimeDelta::minutes(1));
        assert_eq!(
            codec.verify(&issued.token).expect_err("expired"),
            TokenCodecError::expired()
        );
    }

    #[rstest]
    fn overflowing_lifetime_is_an_issue_error(clock: Arc<MutableClock>) {
        let codec = JwtTokenCodec::new(
            vec![7; 32],
            TimeDelta::hours(i64::from(u32::MAX)),
            clock.clone(),
        );
        let err = codec.issue(&UserId::random()).expect_err("overflow");
        assert!(matches!(err, TokenCodecError::Issue { .. }), "{err:?}");
    }

    #[rstest]
    fn swapped_payload_fails_signature_check(clock: Arc<MutableClock>) {
        let codec = codec(&clock);
        let mine = segments(&codec.issue(&UserId::random()).expect("issue").token);
        let theirs = segments(&codec.issue(&UserId::random()).expect("issue").token);

        let forged = BearerToken::new(format!("{}.{}.{}", mine[0], theirs[1], mine[2]));
        assert_eq!(
            codec.verify(&forged).expect_err("forged"),
            TokenCodecError::bad_signature()
        );
    }

    #[rstest]
    fn tokens_from_another_key_are_rejected(clock: Arc<MutableClock>) {
        let other = JwtTokenCodec::new(vec![9; 32], TimeDelta::hours(1), clock.clone());
        let issued = other.issue(&UserId::random()).expect("issue");
        assert_eq!(
            codec(&clock).verify(&issued.token).expect_err("wrong key"),
            TokenCodecError::bad_signature()
        );
    }

    #[rstest]
    #[case("no-separator")]
    #[case("payload.signature")]
    #[case("")]
    fn malformed_tokens_are_rejected(clock: Arc<MutableClock>, #[case] raw: &str) {
        let err = codec(&clock)
            .verify(&BearerToken::new(raw))
            .expect_err("malformed");
        assert!(matches!(err, TokenCodecError::Malformed { .. }), "{err:?}");
    }

    #[rstest]
    fn debug_output_hides_the_key(clock: Arc<MutableClock>) {
        let rendered = format!("{:?}", codec(&clock));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("[7, 7"));
    }

    #[rstest]
    fn ephemeral_codecs_do_not_share_keys(clock: Arc<MutableClock>) {
        let a = JwtTokenCodec::ephemeral(TimeDelta::hours(1), clock.clone());
        let b = JwtTokenCodec::ephemeral(TimeDelta::hours(1), clock.clone());
        let issued = a.issue(&UserId::random()).expect("issue");
        assert!(a.verify(&issued.token).is_ok());
        assert!(b.verify(&issued.token).is_err());
    }
}
