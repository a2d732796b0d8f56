//! Spawns the app on a random port with every outbound collaborator replaced by a `MockServer`.
use std::{
    net::SocketAddr,
    sync::OnceLock,
};

use anyhow::Result;
use biblefit::{
    config::{AppConfig, CaptchaConfig, EmailConfig, Environment, NetConfig, StoreConfig},
    init_dbg_tracing, App,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const OPERATOR_ADDR: &str = "operator@example.com";
pub const PROJECT_ID: i64 = 4;

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub captcha_server: MockServer,
    pub store_server: MockServer,
    pub email_server: MockServer,
}

fn _init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        init_dbg_tracing();
    });
}

/// A fully configured local config pointing at the given mock servers.
/// Binding *port 0* will trigger an OS scan for an available port.
fn test_config(captcha: &MockServer, store: &MockServer, email: &MockServer) -> AppConfig {
    AppConfig {
        environment: Environment::Local,
        net_config: NetConfig {
            host: [127, 0, 0, 1],
            app_port: 0,
        },
        captcha_config: CaptchaConfig {
            verify_url: format!("{}/recaptcha/api/siteverify", captcha.uri()),
            secret: Some(SecretString::from("captcha-secret")),
            timeout_millis: Some(1000),
        },
        store_config: StoreConfig {
            url: Some(store.uri()),
            anon_key: Some(SecretString::from("anon-key")),
            table: "signups".to_string(),
            project_id: PROJECT_ID,
            timeout_millis: Some(1000),
        },
        email_config: EmailConfig {
            url: email.uri(),
            sender: "BibleFit <onboarding@example.com>".to_string(),
            operator_addr: OPERATOR_ADDR.to_string(),
            api_key: Some(SecretString::from("re_test_key")),
            timeout_millis: Some(1000),
        },
    }
}

impl TestApp {
    /// A helper function that tries to spawn a separate task to serve our app
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Like `spawn`, but lets the caller adjust the config before the app is built.
    pub async fn spawn_with(customize: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        // _init_test_subscriber();

        let captcha_server = MockServer::start().await;
        let store_server = MockServer::start().await;
        let email_server = MockServer::start().await;

        let mut config = test_config(&captcha_server, &store_server, &email_server);
        customize(&mut config);

        let app = App::build_from_config(config).await?;
        let addr = app.local_addr()?;

        tokio::spawn(biblefit::serve(app));

        Ok(TestApp {
            addr,
            http_client: reqwest::Client::new(),
            captcha_server,
            store_server,
            email_server,
        })
    }

    pub async fn post_subscribe(&self, body: &Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(format!("http://{}/api/subscribe", self.addr))
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    pub async fn mock_captcha(&self, success: bool, expected_calls: u64) {
        Mock::given(path("/recaptcha/api/siteverify"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": success,
                "error-codes": if success { json!([]) } else { json!(["invalid-input-response"]) },
            })))
            .expect(expected_calls)
            .mount(&self.captcha_server)
            .await;
    }

    pub async fn mock_store(&self, status: u16, row_id: i64, expected_calls: u64) {
        let template = if (200..300).contains(&status) {
            ResponseTemplate::new(status).set_body_json(json!([{
                "id": row_id,
                "created_at": "2026-10-16T12:00:00+00:00",
                "name": "Ursula",
                "email": "ursula@example.com",
                "is_subscribed": true,
                "project_id": PROJECT_ID,
            }]))
        } else {
            ResponseTemplate::new(status).set_body_string("connection to the database lost")
        };

        Mock::given(path("/rest/v1/signups"))
            .and(method("POST"))
            .respond_with(template)
            .expect(expected_calls)
            .mount(&self.store_server)
            .await;
    }

    pub async fn mock_email(&self, status: u16, expected_calls: u64) {
        let template = if (200..300).contains(&status) {
            ResponseTemplate::new(status).set_body_json(json!({ "id": "email-123" }))
        } else {
            ResponseTemplate::new(status).set_body_string("invalid api key")
        };

        Mock::given(path("/emails"))
            .and(method("POST"))
            .respond_with(template)
            .expect(expected_calls)
            .mount(&self.email_server)
            .await;
    }
}

pub fn valid_body() -> Value {
    json!({
        "name": "Ursula",
        "email": "ursula@example.com",
        "recaptchaToken": "solved-challenge",
    })
}
