//! Cookie helpers
//!
//! Handlers read and write cookies through `axum_extra`'s `CookieJar`, which
//! percent-encodes values on the way out and decodes them on the way in.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use roost_auth::TokenStore;

/// Signed session cookie
pub const SESSION_COOKIE: &str = "next-auth.session-token";

/// Double-submit CSRF cookie
pub const CSRF_COOKIE: &str = "next-auth.csrf-token";

/// Signed pending Google sign-in
pub const STATE_COOKIE: &str = "next-auth.oauth-state";

/// Backend token readable by the browser's own scripts
pub use roost_auth::AUTH_TOKEN_KEY as AUTH_TOKEN_COOKIE;

/// Value of a request cookie.
pub fn value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|c| c.value().to_string())
}

/// Request cookies seen as a token store
pub struct RequestCookies<'a>(pub &'a CookieJar);

impl TokenStore for RequestCookies<'_> {
    fn get(&self, key: &str) -> Option<String> {
        value(self.0, key).filter(|v| !v.is_empty())
    }
}

/// Attributes of a cookie being set
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
}

impl CookieOptions {
    pub fn http_only(secure: bool) -> Self {
        Self {
            max_age: None,
            http_only: true,
            secure,
        }
    }

    pub fn max_age(mut self, secs: i64) -> Self {
        self.max_age = Some(secs);
        self
    }
}

/// Site-wide cookie with `SameSite=Lax`.
pub fn build(name: &'static str, value: impl Into<String>, opts: CookieOptions) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value.into()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(opts.http_only)
        .secure(opts.secure);
    if let Some(secs) = opts.max_age {
        builder = builder.max_age(time::Duration::seconds(secs));
    }
    builder.build()
}

/// Cookie that expires `name` whether or not the request carried it.
pub fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, ""))
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}
