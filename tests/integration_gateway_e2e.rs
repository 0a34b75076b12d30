use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use zeroize::Zeroizing;

use gearbox::{AppState, Config};

/// One request the fake upstream received.
#[derive(Clone, Debug)]
struct RecordedHit {
    method: String,
    path_and_query: String,
    bearer: Option<String>,
}

/// In-process stand-in for the external REST API. Records every request it
/// sees so tests can assert what was (and was not) forwarded.
#[derive(Clone, Default)]
struct MockUpstream {
    hits: Arc<Mutex<Vec<RecordedHit>>>,
}

impl MockUpstream {
    fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    fn hits_for(&self, method: &str, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.method == method && h.path_and_query.starts_with(path))
            .count()
    }

    fn last_bearer_for(&self, method: &str, path: &str) -> Option<String> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|h| h.method == method && h.path_and_query.starts_with(path))
            .and_then(|h| h.bearer.clone())
    }
}

fn json_response(status: u16, body: Value) -> Response {
    (
        axum::http::StatusCode::from_u16(status).unwrap(),
        axum::Json(body),
    )
        .into_response()
}

async fn mock_upstream_handler(State(mock): State<MockUpstream>, req: Request) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|p| p.to_string())
        .unwrap_or_default();
    let bearer = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    mock.hits.lock().unwrap().push(RecordedHit {
        method: method.clone(),
        path_and_query,
        bearer,
    });

    match (method.as_str(), path.as_str()) {
        ("POST", "/users/login") => {
            let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({}));
            if body["password"] == "gears4ever" {
                json_response(
                    200,
                    json!({
                        "user": {
                            "_id": "u-100",
                            "name": "Asha Rao",
                            "email": "asha@example.com",
                            "phone": "555-0101",
                            "designation": "Service Lead",
                            "isReadOnly": false
                        },
                        "accessToken": "upstream-token-100"
                    }),
                )
            } else {
                json_response(401, json!({"error": "Invalid credentials"}))
            }
        }
        ("GET", "/clients") => json_response(
            200,
            json!([
                {"_id": "abc", "name": "Mill North"},
                {"_id": "def", "name": "Mill South"}
            ]),
        ),
        ("GET", "/clients/abc") => json_response(
            200,
            json!({"_id": "abc", "name": "Mill North", "machines": []}),
        ),
        ("GET", "/clients/missing") => json_response(404, json!({"error": "Client not found"})),
        ("GET", "/clients/abc/orders") => json_response(
            200,
            json!([{"_id": "1", "orderNumber": "O-1", "status": "pending"}]),
        ),
        ("GET", "/machines/machine-category") => {
            json_response(200, json!([{"_id": "cat-1", "name": "Compressors"}]))
        }
        ("POST", "/clients") => json_response(200, json!({"_id": "new-1", "name": "Fresh Client"})),
        ("GET", "/products/nope") => json_response(404, json!({"error": "Product not found"})),
        ("PUT", "/users/profile") => json_response(200, json!({"success": true})),
        ("POST", "/upload") | ("POST", "/upload/multiple") | ("POST", "/upload/audit-report") => {
            // Echo the multipart field names back so tests can check the
            // re-wrapping the gateway performed.
            let mut field_names = Vec::new();
            let mut multipart = Multipart::from_request(req, &()).await.unwrap();
            while let Some(field) = multipart.next_field().await.unwrap() {
                field_names.push(field.name().unwrap_or("").to_string());
                let _ = field.bytes().await.unwrap();
            }
            json_response(200, json!({"received": field_names}))
        }
        ("POST", "/users/profile-picture") => {
            let mut multipart = Multipart::from_request(req, &()).await.unwrap();
            while let Some(field) = multipart.next_field().await.unwrap() {
                let _ = field.bytes().await.unwrap();
            }
            json_response(
                200,
                json!({"profileImage": "https://cdn.example.com/avatars/u-100.png"}),
            )
        }
        _ => json_response(200, json!({"ok": true})),
    }
}

/// Shared test context: a mock upstream plus the gateway wired to it, both
/// on ephemeral ports.
struct TestContext {
    client: reqwest::Client,
    base_url: String,
    upstream: MockUpstream,
}

impl TestContext {
    async fn spawn() -> Self {
        let upstream = MockUpstream::default();
        let mock_router = Router::new()
            .fallback(mock_upstream_handler)
            .with_state(upstream.clone());
        let mock_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mock_addr = mock_listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(mock_listener, mock_router).await.unwrap();
        });

        let base_url = Self::spawn_app(format!("http://{}", mock_addr)).await;

        Self {
            client: Self::build_client(),
            base_url,
            upstream,
        }
    }

    async fn spawn_app(upstream_api_url: String) -> String {
        let config = Config {
            upstream_api_url,
            session_secret: Zeroizing::new(vec![7u8; 32]),
            session_duration_days: 7,
            port: 0,
            public_dir: "public".to_string(),
            production: false,
        };
        let state = AppState::new(&config).unwrap();
        let app = gearbox::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        format!("http://{}", addr)
    }

    fn build_client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    /// Signs in and returns the CSRF token for mutating calls.
    async fn login(&self) -> String {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({"email": "asha@example.com", "password": "gears4ever"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200, "Login failed");

        let cookies = response.cookies().collect::<Vec<_>>();
        let csrf_cookie = cookies
            .iter()
            .find(|c| c.name() == "csrf_token")
            .expect("CSRF token not found in login response");
        csrf_cookie.value().to_string()
    }
}

fn pdf_part(name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(b"%PDF-1.4 test".to_vec())
        .file_name(name.to_string())
        .mime_str("application/pdf")
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_issues_cookies_and_keeps_token_out_of_the_body() {
        let context = TestContext::spawn().await;

        let response = context
            .client
            .post(format!("{}/api/auth/login", context.base_url))
            .json(&json!({"email": "asha@example.com", "password": "gears4ever"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200, "Login failed");

        let cookies = response.cookies().collect::<Vec<_>>();
        let session = cookies
            .iter()
            .find(|c| c.name() == "session_token")
            .expect("session cookie missing");
        assert!(session.http_only(), "session cookie must be HttpOnly");

        let csrf = cookies
            .iter()
            .find(|c| c.name() == "csrf_token")
            .expect("csrf cookie missing");
        assert!(!csrf.http_only(), "csrf cookie must be readable");

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["userId"], "u-100");
        assert_eq!(body["user"]["name"], "Asha Rao");
        assert_eq!(body["user"]["isReadOnly"], false);
        assert!(
            body.get("accessToken").is_none() && body["user"].get("accessToken").is_none(),
            "access token must never reach the response body"
        );

        assert_eq!(context.upstream.hits_for("POST", "/users/login"), 1);
    }

    #[tokio::test]
    async fn bad_credentials_do_not_create_a_session() {
        let context = TestContext::spawn().await;

        let response = context
            .client
            .post(format!("{}/api/auth/login", context.base_url))
            .json(&json!({"email": "asha@example.com", "password": "wrong"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        assert!(
            !response.cookies().any(|c| c.name() == "session_token"),
            "no session cookie on failed login"
        );
    }

    #[tokio::test]
    async fn api_calls_without_session_are_rejected_before_any_forward() {
        let context = TestContext::spawn().await;

        let response = context
            .client
            .get(format!("{}/api/clients", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(context.upstream.hit_count(), 0, "upstream must not be called");
    }

    #[tokio::test]
    async fn unauthenticated_site_visit_delete_is_refused_without_upstream_call() {
        let context = TestContext::spawn().await;

        let response = context
            .client
            .delete(format!(
                "{}/api/clients/abc/site-visits?visitID=xyz",
                context.base_url
            ))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(context.upstream.hit_count(), 0, "upstream must not be called");
    }

    #[tokio::test]
    async fn tampered_session_cookie_is_rejected() {
        let context = TestContext::spawn().await;

        let response = context
            .client
            .get(format!("{}/api/clients", context.base_url))
            .header("cookie", "session_token=not-a-real-token")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        assert_eq!(context.upstream.hit_count(), 0);
    }

    #[tokio::test]
    async fn relays_order_list_unmodified_with_bearer_attached() {
        let context = TestContext::spawn().await;
        context.login().await;

        let response = context
            .client
            .get(format!("{}/api/clients/abc/orders", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!([{"_id": "1", "orderNumber": "O-1", "status": "pending"}]),
            "order payload must pass through unmodified"
        );

        assert_eq!(context.upstream.hits_for("GET", "/clients/abc/orders"), 1);
        assert_eq!(
            context
                .upstream
                .last_bearer_for("GET", "/clients/abc/orders"),
            Some("Bearer upstream-token-100".to_string())
        );
    }

    #[tokio::test]
    async fn upstream_error_status_and_payload_pass_through() {
        let context = TestContext::spawn().await;
        context.login().await;

        let response = context
            .client
            .get(format!("{}/api/products/nope", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 404, "status must match upstream");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Product not found");
    }

    #[tokio::test]
    async fn create_client_returns_201() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let response = context
            .client
            .post(format!("{}/api/clients", context.base_url))
            .header("X-CSRF-Token", csrf)
            .json(&json!({"name": "Fresh Client"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["_id"], "new-1");
        assert_eq!(context.upstream.hits_for("POST", "/clients"), 1);
    }

    #[tokio::test]
    async fn mutating_call_without_csrf_header_is_rejected() {
        let context = TestContext::spawn().await;
        context.login().await;

        let response = context
            .client
            .post(format!("{}/api/clients", context.base_url))
            .json(&json!({"name": "Fresh Client"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        assert_eq!(
            context.upstream.hits_for("POST", "/clients"),
            0,
            "request must die at the CSRF check"
        );
    }

    #[tokio::test]
    async fn spare_part_update_requires_part_id() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;
        let url = format!(
            "{}/api/clients/abc/machines/m-1/spare-parts",
            context.base_url
        );

        let response = context
            .client
            .put(&url)
            .header("X-CSRF-Token", csrf.clone())
            .json(&json!({"quantity": 2}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "sparePartID is required");
        assert_eq!(
            context
                .upstream
                .hits_for("PUT", "/clients/abc/machines/m-1/spare-parts"),
            0,
            "nothing must be forwarded without a part id"
        );

        let response = context
            .client
            .put(&url)
            .header("X-CSRF-Token", csrf)
            .json(&json!({"sparePartID": "sp-9", "quantity": 2}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(
            context
                .upstream
                .hits_for("PUT", "/clients/abc/machines/m-1/spare-parts"),
            1
        );
    }

    #[tokio::test]
    async fn authed_site_visit_delete_forwards_the_query() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let response = context
            .client
            .delete(format!(
                "{}/api/clients/abc/site-visits?visitID=xyz",
                context.base_url
            ))
            .header("X-CSRF-Token", csrf)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(
            context
                .upstream
                .hits_for("DELETE", "/clients/abc/site-visits?visitID=xyz"),
            1
        );
    }

    #[tokio::test]
    async fn site_visit_delete_without_visit_id_is_a_local_400() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let response = context
            .client
            .delete(format!("{}/api/clients/abc/site-visits", context.base_url))
            .header("X-CSRF-Token", csrf)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "visitID is required");
        assert_eq!(
            context.upstream.hits_for("DELETE", "/clients/abc/site-visits"),
            0
        );
    }

    #[tokio::test]
    async fn single_upload_is_rewrapped_under_the_files_field() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let form = reqwest::multipart::Form::new().part("file", pdf_part("manual.pdf"));

        let response = context
            .client
            .post(format!("{}/api/upload", context.base_url))
            .header("X-CSRF-Token", csrf)
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body["received"],
            json!(["files"]),
            "upstream must see the gateway's field name, not the browser's"
        );
    }

    #[tokio::test]
    async fn audit_report_upload_is_rewrapped_under_the_report_field() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let form = reqwest::multipart::Form::new().part("file", pdf_part("audit.pdf"));

        let response = context
            .client
            .post(format!("{}/api/upload/audit-report", context.base_url))
            .header("X-CSRF-Token", csrf)
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["received"], json!(["report"]));
    }

    #[tokio::test]
    async fn multi_upload_enforces_the_file_cap_locally() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let mut form = reqwest::multipart::Form::new();
        for i in 0..5 {
            form = form.part("files", pdf_part(&format!("doc-{}.pdf", i)));
        }

        let response = context
            .client
            .post(format!("{}/api/upload/multiple", context.base_url))
            .header("X-CSRF-Token", csrf.clone())
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "A maximum of 4 files can be uploaded at once");
        assert_eq!(context.upstream.hits_for("POST", "/upload/multiple"), 0);

        let mut form = reqwest::multipart::Form::new();
        for i in 0..2 {
            form = form.part("files", pdf_part(&format!("doc-{}.pdf", i)));
        }

        let response = context
            .client
            .post(format!("{}/api/upload/multiple", context.base_url))
            .header("X-CSRF-Token", csrf)
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["received"], json!(["files", "files"]));
        assert_eq!(context.upstream.hits_for("POST", "/upload/multiple"), 1);
    }

    #[tokio::test]
    async fn upload_without_a_file_is_a_local_400() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let form = reqwest::multipart::Form::new().text("note", "no file here");

        let response = context
            .client
            .post(format!("{}/api/upload", context.base_url))
            .header("X-CSRF-Token", csrf)
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "No file provided");
        assert_eq!(context.upstream.hits_for("POST", "/upload"), 0);
    }

    #[tokio::test]
    async fn profile_update_merges_into_the_session() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let before = context
            .client
            .get(format!("{}/api/auth/session", context.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(before.status().as_u16(), 200);
        let before: Value = before.json().await.unwrap();
        assert_eq!(before["user"]["name"], "Asha Rao");

        let response = context
            .client
            .put(format!("{}/api/users/profile", context.base_url))
            .header("X-CSRF-Token", csrf)
            .json(&json!({"name": "Asha R."}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(context.upstream.hits_for("PUT", "/users/profile"), 1);

        let after = context
            .client
            .get(format!("{}/api/auth/session", context.base_url))
            .send()
            .await
            .unwrap();
        let after: Value = after.json().await.unwrap();

        assert_eq!(after["user"]["name"], "Asha R.");
        assert_eq!(
            after["user"]["email"], before["user"]["email"],
            "fields outside the patch must survive"
        );
        assert_eq!(after["user"]["phone"], before["user"]["phone"]);
        assert_eq!(after["user"]["isReadOnly"], before["user"]["isReadOnly"]);
        assert_eq!(
            after["expires"], before["expires"],
            "a profile edit must not extend the session"
        );
    }

    #[tokio::test]
    async fn profile_picture_upload_renews_the_session_image() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let part = reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G'])
            .file_name("me.png")
            .mime_str("image/png")
            .unwrap();
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = context
            .client
            .post(format!("{}/api/users/profile-picture", context.base_url))
            .header("X-CSRF-Token", csrf)
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);

        let session = context
            .client
            .get(format!("{}/api/auth/session", context.base_url))
            .send()
            .await
            .unwrap();
        let session: Value = session.json().await.unwrap();
        assert_eq!(
            session["user"]["profileImage"],
            "https://cdn.example.com/avatars/u-100.png"
        );
    }

    #[tokio::test]
    async fn forgot_password_validates_the_email_locally() {
        let context = TestContext::spawn().await;

        let response = context
            .client
            .post(format!("{}/api/auth/forgot-password", context.base_url))
            .json(&json!({"email": "not-an-email"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Please enter a valid email address");
        assert_eq!(context.upstream.hit_count(), 0, "no network call for junk input");

        let response = context
            .client
            .post(format!("{}/api/auth/forgot-password", context.base_url))
            .json(&json!({"email": "asha@example.com"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(
            context.upstream.hits_for("POST", "/users/forgot-password"),
            1
        );
    }

    #[tokio::test]
    async fn client_page_redirects_anonymous_visitors_to_login() {
        let context = TestContext::spawn().await;

        let response = context
            .client
            .get(format!("{}/client-management", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 303);
        assert_eq!(
            response.headers().get("location").unwrap().to_str().unwrap(),
            "/login"
        );
        assert_eq!(context.upstream.hit_count(), 0);
    }

    #[tokio::test]
    async fn client_page_assembles_data_in_parallel() {
        let context = TestContext::spawn().await;
        context.login().await;

        let response = context
            .client
            .get(format!("{}/client-management", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["user"]["name"], "Asha Rao");
        assert_eq!(body["clients"].as_array().unwrap().len(), 2);
        assert_eq!(body["machineCategories"][0]["name"], "Compressors");

        assert_eq!(context.upstream.hits_for("GET", "/clients"), 1);
        assert_eq!(
            context.upstream.hits_for("GET", "/machines/machine-category"),
            1
        );
    }

    #[tokio::test]
    async fn missing_client_detail_redirects_to_the_overview() {
        let context = TestContext::spawn().await;
        context.login().await;

        let response = context
            .client
            .get(format!("{}/client-management/missing", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 303);
        assert_eq!(
            response.headers().get("location").unwrap().to_str().unwrap(),
            "/client-management"
        );
    }

    #[tokio::test]
    async fn existing_client_detail_includes_the_record() {
        let context = TestContext::spawn().await;
        context.login().await;

        let response = context
            .client
            .get(format!("{}/client-management/abc", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["client"]["_id"], "abc");
        assert_eq!(body["client"]["name"], "Mill North");
        assert_eq!(body["clients"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let context = TestContext::spawn().await;
        let csrf = context.login().await;

        let response = context
            .client
            .post(format!("{}/api/auth/logout", context.base_url))
            .header("X-CSRF-Token", csrf)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);

        let response = context
            .client
            .get(format!("{}/api/auth/session", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn unreachable_upstream_reports_a_generic_500() {
        // Grab a port nobody is listening on.
        let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = dead.local_addr().unwrap();
        drop(dead);

        let base_url = TestContext::spawn_app(format!("http://{}", dead_addr)).await;
        let client = TestContext::build_client();

        // Mint a valid session directly; login cannot succeed without an
        // upstream to talk to.
        let keys = gearbox::services::session::SessionKeys::new(&[7u8; 32], 7);
        let user = gearbox::models::upstream::UpstreamUser {
            id: "u-100".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            designation: None,
            profile_image: None,
            is_read_only: false,
        };
        let token = keys.issue(&user, "upstream-token-100").unwrap();

        let response = client
            .get(format!("{}/api/clients", base_url))
            .header("cookie", format!("session_token={}", token))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to reach upstream service");
    }
}
