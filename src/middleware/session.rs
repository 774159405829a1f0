//! Cookie di sessione `portal_session`.
//!
//! Il cookie è l'unica fonte di verità: nessuna tabella lato server, nessuna
//! revoca. Il valore è `base64url(json).base64url(hmac_sha256(json_b64))`.
//! Un cookie copiato resta valido finché il browser non lo fa scadere (24h).

use axum::http::{HeaderMap, HeaderValue, Uri};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use cookie::time::Duration;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::models::Session;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "portal_session";

/// 24 ore
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24;

#[derive(Clone)]
pub struct SessionCodec {
    secret: Vec<u8>,
}

impl SessionCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Segreto casuale: le sessioni non sopravvivono a un riavvio
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let secret: [u8; 32] = rng.gen();
        Self::new(secret)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accetta chiavi di qualunque lunghezza")
    }

    pub fn encode(&self, session: &Session) -> String {
        let json = serde_json::to_vec(session).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", payload, signature)
    }

    /// Decodifica un valore di cookie. Qualunque problema = nessuna sessione.
    pub fn decode(&self, value: &str) -> Option<Session> {
        let (payload, signature) = value.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }

    /// Legge la sessione dagli header `Cookie` della richiesta
    pub fn read(&self, headers: &HeaderMap) -> Option<Session> {
        let jar = CookieJar::from_headers(headers);
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| self.decode(cookie.value()))
    }

    /// Header `Set-Cookie` che crea la sessione
    pub fn create_cookie(&self, session: &Session, secure: bool) -> HeaderValue {
        let max_age = Duration::seconds(SESSION_MAX_AGE_SECS);
        let cookie = session_cookie(self.encode(session), max_age)
            .secure(secure)
            .build();
        // base64url e attributi fissi: sempre ASCII visibile
        HeaderValue::from_str(&cookie.to_string()).unwrap_or_else(|_| destroy_cookie())
    }
}

fn session_cookie(value: String, max_age: Duration) -> cookie::CookieBuilder<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
}

/// Header `Set-Cookie` che cancella la sessione
pub fn destroy_cookie() -> HeaderValue {
    let cookie = session_cookie(String::new(), Duration::ZERO).build();
    HeaderValue::from_str(&cookie.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("portal_session=; Path=/; Max-Age=0; HttpOnly"))
}

/// HTTPS diretto o dietro un proxy che imposta `x-forwarded-proto`
pub fn is_secure_request(headers: &HeaderMap, uri: &Uri) -> bool {
    let forwarded_https = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().eq_ignore_ascii_case("https"))
        .unwrap_or(false);

    forwarded_https || uri.scheme_str() == Some("https")
}
