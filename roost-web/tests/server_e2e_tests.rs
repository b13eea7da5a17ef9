//! End-to-end tests for the HTTP surface.
//!
//! Each test serves the real router on an ephemeral port. The booking backend
//! and Google (OAuth and Maps) are wiremock servers, so the tests see both the
//! browser-facing responses and every outbound call.

use reqwest::{header, Client, Response, StatusCode};
use roost_auth::{OAuthConfig, RedirectPolicy};
use roost_upstream::{ServiceConfig, ServiceEndpoint};
use roost_web::{create_router, AppState, Config};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, header as header_is, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A running server plus its mock upstreams.
struct TestServer {
    base_url: String,
    backend: MockServer,
    google: MockServer,
    http: Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(RedirectPolicy::default()).await
    }

    async fn start_with(redirects: RedirectPolicy) -> Self {
        Self::configured(|config| config.redirects = redirects).await
    }

    async fn configured(adjust: impl FnOnce(&mut Config)) -> Self {
        let backend = MockServer::start().await;
        let google = MockServer::start().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let bind_address = listener.local_addr().unwrap();
        let base_url = format!("http://{}", bind_address);

        let mut oauth = OAuthConfig::google(
            "client-id",
            "client-secret",
            format!("{}/api/auth/callback/google", base_url),
        );
        oauth.auth_url = format!("{}/auth", google.uri());
        oauth.token_url = format!("{}/token", google.uri());
        oauth.userinfo_url = format!("{}/userinfo", google.uri());

        let mut config = Config {
            bind_address,
            base_url: base_url.clone(),
            secret: "test-nextauth-secret".to_string(),
            oauth,
            redirects: RedirectPolicy::default(),
            services: ServiceConfig {
                backend: ServiceEndpoint {
                    base_url: backend.uri(),
                    api_key: None,
                },
                maps: ServiceEndpoint {
                    base_url: google.uri(),
                    api_key: Some("test-maps-key".to_string()),
                },
                timeout_secs: None,
            },
        };
        adjust(&mut config);

        let app = create_router(Arc::new(AppState::new(config).unwrap()));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let http = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url,
            backend,
            google,
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch a CSRF token; returns (token, cookie value).
    async fn csrf(&self) -> (String, String) {
        let resp = self.http.get(self.url("/api/auth/csrf")).send().await.unwrap();
        let cookie = set_cookie(&resp, "next-auth.csrf-token").unwrap();
        let body: Value = resp.json().await.unwrap();
        (body["csrfToken"].as_str().unwrap().to_string(), cookie)
    }

    async fn session(&self, session_cookie: &str) -> Value {
        self.http
            .get(self.url("/api/auth/session"))
            .header(
                header::COOKIE,
                format!("next-auth.session-token={}", session_cookie),
            )
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

/// Value of a cookie set by the response.
fn set_cookie(resp: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|c| {
            c.split(';')
                .next()?
                .strip_prefix(prefix.as_str())
                .map(str::to_string)
        })
}

fn location(resp: &Response) -> String {
    resp.headers()[header::LOCATION].to_str().unwrap().to_string()
}

// payload segment: {"_id":"abc123"}
const BACKEND_TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJfaWQiOiJhYmMxMjMifQ.sig";

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_review_without_auth_token_is_rejected() {
    let server = TestServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server.backend)
        .await;

    let resp = server
        .http
        .post(server.url("/api/analytics/review/prop-42"))
        .json(&json!({ "rating": 5, "comment": "Lovely" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn test_review_missing_comment_is_rejected() {
    let server = TestServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server.backend)
        .await;

    for review in [json!({ "rating": 5 }), json!({ "comment": "No rating" })] {
        let resp = server
            .http
            .post(server.url("/api/analytics/review/prop-42"))
            .header(header::COOKIE, format!("auth_Token={}", BACKEND_TOKEN))
            .json(&review)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Rating and comment are required" }));
    }
}

#[tokio::test]
async fn test_review_forwarded_with_bearer() {
    let server = TestServer::start().await;
    let review = json!({ "rating": 4, "comment": "Quiet street", "stayId": "s-9" });

    Mock::given(method("POST"))
        .and(path("/api/analytics/review/prop-42"))
        .and(header_is("Authorization", format!("Bearer {}", BACKEND_TOKEN).as_str()))
        .and(body_json(review.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "review-7",
            "rating": 4
        })))
        .expect(1)
        .mount(&server.backend)
        .await;

    let resp = server
        .http
        .post(server.url("/api/analytics/review/prop-42"))
        .header(header::COOKIE, format!("theme=dark; auth_Token={}", BACKEND_TOKEN))
        .json(&review)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["_id"], "review-7");
}

#[tokio::test]
async fn test_review_upstream_failure_is_generic() {
    let server = TestServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/analytics/review/prop-42"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Stay not completed"
        })))
        .expect(1)
        .mount(&server.backend)
        .await;

    let resp = server
        .http
        .post(server.url("/api/analytics/review/prop-42"))
        .header(header::COOKIE, format!("auth_Token={}", BACKEND_TOKEN))
        .json(&json!({ "rating": 1, "comment": "Too early" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to add review" }));
}

#[tokio::test]
async fn test_property_reviews_are_not_cached() {
    let server = TestServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/analytics/reviews/property/prop-42"))
        .and(header_is("Cache-Control", "no-store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "rating": 5, "comment": "Spotless" }
        ])))
        .expect(1)
        .mount(&server.backend)
        .await;

    let resp = server
        .http
        .get(server.url("/api/analytics/reviews/property/prop-42"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body[0]["comment"], "Spotless");
}

#[tokio::test]
async fn test_property_reviews_failure() {
    let server = TestServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/analytics/reviews/property/prop-42"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server.backend)
        .await;

    let resp = server
        .http
        .get(server.url("/api/analytics/reviews/property/prop-42"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to fetch reviews" }));
}

// =============================================================================
// Maps
// =============================================================================

#[tokio::test]
async fn test_geocode_relays_upstream_json() {
    let server = TestServer::start().await;
    let upstream = json!({
        "results": [{
            "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
            "geometry": { "location": { "lat": 37.422, "lng": -122.084 } }
        }],
        "status": "OK"
    });

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", "1600 Amphitheatre Parkway"))
        .and(query_param("key", "test-maps-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
        .expect(1)
        .mount(&server.google)
        .await;

    let resp = server
        .http
        .get(server.url("/api/geocode?address=1600+Amphitheatre+Parkway"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, upstream);
}

#[tokio::test]
async fn test_geocode_without_maps_key_fails_locally() {
    let server = TestServer::configured(|config| config.services.maps.api_key = None).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED"
        })))
        .expect(0)
        .mount(&server.google)
        .await;

    let resp = server
        .http
        .get(server.url("/api/geocode?address=Lisbon"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to fetch geocode data" }));
}

#[tokio::test]
async fn test_geocode_requires_address() {
    let server = TestServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server.google)
        .await;

    for uri in ["/api/geocode", "/api/geocode?address="] {
        let resp = server.http.get(server.url(uri)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Address parameter is required" }));
    }
}

#[tokio::test]
async fn test_distance_matrix_missing_mode() {
    let server = TestServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server.google)
        .await;

    let resp = server
        .http
        .get(server.url("/api/distance-matrix?origins=Lisbon&destinations=Porto"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.text().await.unwrap(),
        r#"{"error":"origins, destinations, and mode parameters are required"}"#
    );
}

#[tokio::test]
async fn test_distance_matrix_relays_upstream_json() {
    let server = TestServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/distancematrix/json"))
        .and(query_param("origins", "Lisbon"))
        .and(query_param("destinations", "Porto"))
        .and(query_param("mode", "transit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rows": [{ "elements": [{ "status": "OK" }] }],
            "status": "OK"
        })))
        .expect(1)
        .mount(&server.google)
        .await;

    let resp = server
        .http
        .get(server.url(
            "/api/distance-matrix?origins=Lisbon&destinations=Porto&mode=transit",
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["rows"][0]["elements"][0]["status"], "OK");
}

#[tokio::test]
async fn test_places_search() {
    let server = TestServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .and(query_param("query", "beach house"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "name": "Casa da Praia" }],
            "status": "OK"
        })))
        .expect(1)
        .mount(&server.google)
        .await;

    let resp = server
        .http
        .get(server.url("/api/places/search?query=beach%20house"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["results"][0]["name"], "Casa da Praia");
}

#[tokio::test]
async fn test_places_search_failure_and_missing_query() {
    let server = TestServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/place/textsearch/json"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server.google)
        .await;

    let resp = server
        .http
        .get(server.url("/api/places/search?query=anything"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to fetch places" }));

    let resp = server
        .http
        .get(server.url("/api/places/search"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Query parameter is required" }));
}

// =============================================================================
// Credentials sign-in
// =============================================================================

#[tokio::test]
async fn test_credentials_sign_in_establishes_session() {
    let server = TestServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({
            "email": "guest@example.com",
            "password": "correct horse"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": BACKEND_TOKEN,
            "user": { "_id": "abc123", "name": "Guest User", "email": "guest@example.com" }
        })))
        .expect(1)
        .mount(&server.backend)
        .await;

    let (csrf_token, csrf_cookie) = server.csrf().await;

    let resp = server
        .http
        .post(server.url("/api/auth/callback/credentials"))
        .header(header::COOKIE, format!("next-auth.csrf-token={}", csrf_cookie))
        .form(&[
            ("email", "guest@example.com"),
            ("password", "correct horse"),
            ("csrfToken", csrf_token.as_str()),
            ("callbackUrl", "/trips"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(set_cookie(&resp, "auth_Token").as_deref(), Some(BACKEND_TOKEN));
    let session_cookie = set_cookie(&resp, "next-auth.session-token").unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["url"], server.url("/trips"));

    let session = server.session(&session_cookie).await;
    assert_eq!(session["jwt"], BACKEND_TOKEN);
    assert_eq!(session["userId"], "abc123");
    assert_eq!(session["user"]["name"], "Guest User");
    assert!(session["expires"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_backend_token_cannot_inject_cookie_attributes() {
    let server = TestServer::start().await;
    let hostile = "a.b.c; Domain=evil.example; Path=/admin";

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": hostile })))
        .mount(&server.backend)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/analytics/review/prop-42"))
        .and(header_is("Authorization", format!("Bearer {}", hostile).as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "review-8" })))
        .expect(1)
        .mount(&server.backend)
        .await;

    let (csrf_token, csrf_cookie) = server.csrf().await;
    let resp = server
        .http
        .post(server.url("/api/auth/callback/credentials"))
        .header(header::COOKIE, format!("next-auth.csrf-token={}", csrf_cookie))
        .form(&[
            ("email", "guest@example.com"),
            ("password", "pw"),
            ("csrfToken", csrf_token.as_str()),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    for value in resp.headers().get_all(header::SET_COOKIE) {
        let value = value.to_str().unwrap();
        assert!(!value.contains("Domain="), "{}", value);
        assert!(!value.contains("Path=/admin"), "{}", value);
    }

    let auth_cookie = set_cookie(&resp, "auth_Token").unwrap();
    assert_ne!(auth_cookie, hostile);
    let session_cookie = set_cookie(&resp, "next-auth.session-token").unwrap();
    assert_eq!(server.session(&session_cookie).await["jwt"], hostile);

    // the encoded cookie decodes back to the original bearer
    let resp = server
        .http
        .post(server.url("/api/analytics/review/prop-42"))
        .header(header::COOKIE, format!("auth_Token={}", auth_cookie))
        .json(&json!({ "rating": 5, "comment": "Lovely" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_credentials_sign_in_rejected() {
    let server = TestServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid email or password"
        })))
        .expect(1)
        .mount(&server.backend)
        .await;

    let (csrf_token, csrf_cookie) = server.csrf().await;

    let resp = server
        .http
        .post(server.url("/api/auth/callback/credentials"))
        .header(header::COOKIE, format!("next-auth.csrf-token={}", csrf_cookie))
        .form(&[
            ("email", "guest@example.com"),
            ("password", "wrong"),
            ("csrfToken", csrf_token.as_str()),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&resp, "next-auth.session-token").is_none());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "CredentialsSignin");
}

#[tokio::test]
async fn test_credentials_sign_in_requires_csrf_token() {
    let server = TestServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server.backend)
        .await;

    let (_, csrf_cookie) = server.csrf().await;

    let resp = server
        .http
        .post(server.url("/api/auth/callback/credentials"))
        .header(header::COOKIE, format!("next-auth.csrf-token={}", csrf_cookie))
        .form(&[
            ("email", "guest@example.com"),
            ("password", "correct horse"),
            ("csrfToken", "forged"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_csrf_token_reused_while_cookie_is_valid() {
    let server = TestServer::start().await;
    let (token, cookie) = server.csrf().await;

    let resp = server
        .http
        .get(server.url("/api/auth/csrf"))
        .header(header::COOKIE, format!("next-auth.csrf-token={}", cookie))
        .send()
        .await
        .unwrap();

    assert!(set_cookie(&resp, "next-auth.csrf-token").is_none());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["csrfToken"], token.as_str());
}

#[tokio::test]
async fn test_external_callback_url_follows_policy() {
    for (policy, expect_external) in [
        (RedirectPolicy::default(), true),
        (RedirectPolicy::same_origin_only(), false),
    ] {
        let server = TestServer::start_with(policy).await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": BACKEND_TOKEN
            })))
            .mount(&server.backend)
            .await;

        let (csrf_token, csrf_cookie) = server.csrf().await;
        let resp = server
            .http
            .post(server.url("/api/auth/callback/credentials"))
            .header(header::COOKIE, format!("next-auth.csrf-token={}", csrf_cookie))
            .form(&[
                ("email", "guest@example.com"),
                ("password", "pw"),
                ("csrfToken", csrf_token.as_str()),
                ("callbackUrl", "https://elsewhere.example/landing"),
            ])
            .send()
            .await
            .unwrap();

        let body: Value = resp.json().await.unwrap();
        if expect_external {
            assert_eq!(body["url"], "https://elsewhere.example/landing");
        } else {
            assert_eq!(body["url"], server.base_url.as_str());
        }
    }
}

// =============================================================================
// Google sign-in
// =============================================================================

/// Start a Google sign-in; returns (state parameter, state cookie).
async fn begin_google_sign_in(server: &TestServer) -> (String, String) {
    let resp = server
        .http
        .get(server.url("/api/auth/signin/google?callbackUrl=/trips"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    let state_cookie = set_cookie(&resp, "next-auth.oauth-state").unwrap();

    let target = url::Url::parse(&location(&resp)).unwrap();
    assert_eq!(target.path(), "/auth");
    let params: std::collections::HashMap<_, _> = target.query_pairs().into_owned().collect();
    assert_eq!(params["code_challenge_method"], "S256");
    assert_eq!(params["client_id"], "client-id");

    (params["state"].clone(), state_cookie)
}

async fn mount_google(server: &TestServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.access",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server.google)
        .await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header_is("Authorization", "Bearer ya29.access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "google-1098",
            "email": "guest@example.com",
            "email_verified": true,
            "name": "Guest User",
            "picture": "https://lh3.example/photo.jpg"
        })))
        .expect(1)
        .mount(&server.google)
        .await;
}

#[tokio::test]
async fn test_google_sign_in_establishes_session() {
    let server = TestServer::start().await;
    mount_google(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .and(body_json(json!({
            "email": "guest@example.com",
            "name": "Guest User",
            "googleId": "google-1098",
            "image": "https://lh3.example/photo.jpg"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "federated.signed.token",
            "user": { "_id": "backend-77" }
        })))
        .expect(1)
        .mount(&server.backend)
        .await;

    let (state, state_cookie) = begin_google_sign_in(&server).await;

    let resp = server
        .http
        .get(server.url(&format!(
            "/api/auth/callback/google?code=auth-code-1&state={}",
            state
        )))
        .header(header::COOKIE, format!("next-auth.oauth-state={}", state_cookie))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), server.url("/trips"));
    assert_eq!(
        set_cookie(&resp, "auth_Token").as_deref(),
        Some("federated.signed.token")
    );

    let session_cookie = set_cookie(&resp, "next-auth.session-token").unwrap();
    let session = server.session(&session_cookie).await;
    assert_eq!(session["jwt"], "federated.signed.token");
    assert_eq!(session["userId"], "backend-77");
    assert_eq!(session["user"]["image"], "https://lh3.example/photo.jpg");
}

#[tokio::test]
async fn test_google_sign_in_with_failing_bridge() {
    let server = TestServer::start().await;
    mount_google(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server.backend)
        .await;

    let (state, state_cookie) = begin_google_sign_in(&server).await;

    let resp = server
        .http
        .get(server.url(&format!(
            "/api/auth/callback/google?code=auth-code-1&state={}",
            state
        )))
        .header(header::COOKIE, format!("next-auth.oauth-state={}", state_cookie))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(set_cookie(&resp, "auth_Token").as_deref(), Some(""));

    let session_cookie = set_cookie(&resp, "next-auth.session-token").unwrap();
    let session = server.session(&session_cookie).await;
    assert_eq!(session["user"]["email"], "guest@example.com");
    assert!(session.get("jwt").is_none());

    // without a backend token, bearer-authenticated calls are refused
    let resp = server
        .http
        .post(server.url("/api/analytics/review/prop-42"))
        .json(&json!({ "rating": 5, "comment": "Lovely" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_google_callback_with_wrong_state_lands_on_base() {
    let server = TestServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server.google)
        .await;

    let (_, state_cookie) = begin_google_sign_in(&server).await;

    let resp = server
        .http
        .get(server.url("/api/auth/callback/google?code=auth-code-1&state=tampered"))
        .header(header::COOKIE, format!("next-auth.oauth-state={}", state_cookie))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), server.base_url);
    assert!(set_cookie(&resp, "next-auth.session-token").is_none());
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn test_session_without_cookie_is_empty() {
    let server = TestServer::start().await;

    let resp = server
        .http
        .get(server.url("/api/auth/session"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({}));

    assert_eq!(server.session("not-a-jwt").await, json!({}));
}

#[tokio::test]
async fn test_sign_out_clears_cookies() {
    let server = TestServer::start().await;

    let resp = server
        .http
        .post(server.url("/api/auth/signout"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(set_cookie(&resp, "next-auth.session-token").as_deref(), Some(""));
    assert_eq!(set_cookie(&resp, "auth_Token").as_deref(), Some(""));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["url"], server.base_url.as_str());
}

#[tokio::test]
async fn test_providers_lists_credentials_and_google() {
    let server = TestServer::start().await;

    let body: Value = server
        .http
        .get(server.url("/api/auth/providers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["credentials"]["type"], "credentials");
    assert_eq!(
        body["google"]["signinUrl"],
        server.url("/api/auth/signin/google")
    );
}
