//! Sign-in surface under `/api/auth`.
//!
//! Credentials and Google sign-ins both end in the session callbacks; the
//! resulting token is stored in a signed session cookie and the backend's
//! token is also copied to the `auth_Token` cookie for the browser's scripts.

use axum::{
    extract::{Query, State},
    http::{header::{CACHE_CONTROL, LOCATION}, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use roost_auth::{
    csrf, AuthError, AuthResult, Credentials, OAuthProviderClient, OAuthState, SessionToken,
    SignIn, StateClaims,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::cookies::{
    self, CookieOptions, AUTH_TOKEN_COOKIE, CSRF_COOKIE, SESSION_COOKIE, STATE_COOKIE,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Where the browser lands when a federated sign-in aborts.
fn callback_error_url(base_url: &str) -> String {
    format!(
        "{}/login?error={}",
        base_url,
        roost_auth::redirect::CALLBACK_ERROR
    )
}

pub async fn providers(State(state): State<Arc<AppState>>) -> Json<Value> {
    let base = state.base_url();
    Json(json!({
        "credentials": {
            "id": "credentials",
            "name": "Credentials",
            "type": "credentials",
            "signinUrl": format!("{}/api/auth/signin/credentials", base),
            "callbackUrl": format!("{}/api/auth/callback/credentials", base),
        },
        "google": {
            "id": "google",
            "name": "Google",
            "type": "oauth",
            "signinUrl": format!("{}/api/auth/signin/google", base),
            "callbackUrl": format!("{}/api/auth/callback/google", base),
        }
    }))
}

/// Hand out the CSRF token, reusing the cookie's when it is still authentic.
pub async fn csrf_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    let secret = &state.config.secret;

    let existing = cookies::value(&jar, CSRF_COOKIE)
        .and_then(|cookie| csrf::token_from_cookie(&cookie, secret));

    let (jar, token) = match existing {
        Some(token) => (jar, token),
        None => {
            let pair = csrf::issue(secret);
            let jar = jar.add(cookies::build(
                CSRF_COOKIE,
                pair.cookie,
                CookieOptions::http_only(state.config.secure_cookies()),
            ));
            (jar, pair.token)
        }
    };

    (jar, Json(json!({ "csrfToken": token }))).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub csrf_token: Option<String>,
    pub callback_url: Option<String>,
}

pub async fn credentials_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<Response> {
    csrf::verify(
        cookies::value(&jar, CSRF_COOKIE).as_deref(),
        form.csrf_token.as_deref(),
        &state.config.secret,
    )?;

    let base = state.base_url();
    let credentials = Credentials::new(form.email, form.password);

    let event = match state.verifier.authorize(&credentials).await {
        Some(user) => SignIn::credentials(user),
        None => return Ok(credentials_rejected(base)),
    };
    if !state.callbacks.sign_in(&event) {
        return Ok(credentials_rejected(base));
    }

    let token = state
        .callbacks
        .jwt(SessionToken::default(), Some(event))
        .await;

    let jar = store_session(&state, token, jar)?;

    let target = form.callback_url.unwrap_or_else(|| base.to_string());
    let url = state.config.redirects.resolve(&target, base);

    tracing::info!("Credentials sign-in completed");
    Ok((jar, Json(json!({ "url": url }))).into_response())
}

fn credentials_rejected(base_url: &str) -> Response {
    tracing::info!("Credentials sign-in refused");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "CredentialsSignin",
            "url": format!("{}/login?error=CredentialsSignin", base_url),
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSignInParams {
    pub callback_url: Option<String>,
}

/// Start a Google sign-in: remember the pending state and send the browser
/// to Google.
pub async fn google_sign_in(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GoogleSignInParams>,
    jar: CookieJar,
) -> ApiResult<Response> {
    let pending = OAuthState::with_pkce().with_redirect(
        params
            .callback_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| state.base_url().to_string()),
    );

    let authorization_url = state.google.authorization_url(&pending).await?;
    let state_cookie = state.jwt.encode_signed(&pending.into_claims())?;

    let jar = jar.add(cookies::build(
        STATE_COOKIE,
        state_cookie,
        CookieOptions::http_only(state.config.secure_cookies())
            .max_age(state.jwt.config().state_duration.num_seconds()),
    ));

    Ok((
        StatusCode::FOUND,
        jar,
        [(LOCATION, location(&authorization_url)?)],
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Finish a Google sign-in. Any failure sends the browser to the callback
/// error page, which the redirect policy maps to the base URL.
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GoogleCallbackParams>,
    jar: CookieJar,
) -> ApiResult<Response> {
    let base = state.base_url();

    let outcome = complete_google_sign_in(&state, &params, &jar).await;
    let jar = jar.add(cookies::removal(STATE_COOKIE));

    let (jar, target) = match outcome {
        Ok((token, redirect_after)) => {
            let jar = store_session(&state, token, jar)?;
            tracing::info!("Google sign-in completed");
            (jar, redirect_after.unwrap_or_else(|| base.to_string()))
        }
        Err(e) => {
            tracing::warn!(error_code = e.error_code(), "Google sign-in failed: {}", e);
            (jar, callback_error_url(base))
        }
    };

    let url = state.config.redirects.resolve(&target, base);

    Ok((StatusCode::FOUND, jar, [(LOCATION, location(&url)?)]).into_response())
}

async fn complete_google_sign_in(
    state: &AppState,
    params: &GoogleCallbackParams,
    jar: &CookieJar,
) -> AuthResult<(SessionToken, Option<String>)> {
    if let Some(error) = &params.error {
        return Err(AuthError::OAuthError(format!("Provider returned {}", error)));
    }
    let code = params
        .code
        .as_deref()
        .ok_or_else(|| AuthError::OAuthError("Missing authorization code".to_string()))?;
    let returned_state = params
        .state
        .as_deref()
        .ok_or_else(|| AuthError::OAuthError("Missing state".to_string()))?;

    let cookie = cookies::value(jar, STATE_COOKIE)
        .ok_or_else(|| AuthError::OAuthError("Missing state cookie".to_string()))?;
    let pending = state.jwt.decode_signed::<StateClaims>(&cookie)?.state;
    pending.verify(returned_state)?;

    let tokens = state.google.exchange_code(code, &pending).await?;
    let info = state.google.get_user_info(&tokens.access_token).await?;

    let event = SignIn::google(&info);
    if !state.callbacks.sign_in(&event) {
        return Err(AuthError::Unauthorized("Sign-in refused".to_string()));
    }

    let token = state
        .callbacks
        .jwt(SessionToken::default(), Some(event))
        .await;

    Ok((token, pending.redirect_after))
}

/// The public session, or `{}` without a valid session cookie.
pub async fn session(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let claims = cookies::value(&jar, SESSION_COOKIE).and_then(|cookie| {
        state
            .jwt
            .decode_session(&cookie)
            .map_err(|e| tracing::debug!("Ignoring session cookie: {}", e))
            .ok()
    });

    // later requests carry no sign-in event
    let body = match claims {
        Some(claims) => {
            let session = state.callbacks.session(&claims.token, claims.expires_at());
            serde_json::to_value(session).unwrap_or_else(|_| json!({}))
        }
        None => json!({}),
    };

    ([(CACHE_CONTROL, "no-store")], Json(body)).into_response()
}

pub async fn sign_out(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let jar = jar
        .add(cookies::removal(SESSION_COOKIE))
        .add(cookies::removal(AUTH_TOKEN_COOKIE));

    (jar, Json(json!({ "url": state.base_url() }))).into_response()
}

/// Sign the session token into the session cookie and expose the backend
/// token to the browser.
fn store_session(state: &AppState, token: SessionToken, jar: CookieJar) -> ApiResult<CookieJar> {
    let secure = state.config.secure_cookies();
    let max_age = state.jwt.config().session_duration.num_seconds();
    let bearer = token.bearer().map(str::to_string);

    let (cookie, _) = state.jwt.issue_session(token)?;
    let jar = jar.add(cookies::build(
        SESSION_COOKIE,
        cookie,
        CookieOptions::http_only(secure).max_age(max_age),
    ));

    let jar = match bearer {
        Some(bearer) => jar.add(cookies::build(
            AUTH_TOKEN_COOKIE,
            bearer,
            CookieOptions {
                max_age: Some(max_age),
                http_only: false,
                secure,
            },
        )),
        None => jar.add(cookies::removal(AUTH_TOKEN_COOKIE)),
    };

    Ok(jar)
}

fn location(url: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(url)
        .map_err(|e| ApiError::Internal(format!("Invalid redirect target: {}", e)))
}
