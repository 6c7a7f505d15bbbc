use std::net::TcpListener;

use actix_web::web;
use once_cell::sync::Lazy;
use signup_forms::{config::FormConfig, domain::FormAction, listener::FormServices, telemetry};
use wiremock::MockServer;

pub const LIST_ID: &str = "a1b2c3d4e5";
pub const SUBSCRIBE_FORM: &str = "1";
pub const REDIRECT_FORM: &str = "2";
pub const UNSUBSCRIBE_FORM: &str = "3";

static TRACING: Lazy<()> = Lazy::new(|| {
    // set TEST_LOG to see the logs of a test run
    if std::env::var("TEST_LOG").is_ok() {
        telemetry::init_subscriber("test", std::io::stdout);
    } else {
        telemetry::init_subscriber("test", std::io::sink);
    }
});

pub struct TestApp {
    pub address: String,
    pub mailchimp: MockServer,
    client: reqwest::Client,
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    // stand-in for the Mailchimp API
    let mailchimp = MockServer::start().await;

    let mut config = signup_forms::config::config().expect("failed to read config.yaml.");
    config.web.port = 0;
    config.mailchimp.base_url = mailchimp.uri();
    config.lists = vec![];
    config.forms = vec![
        FormConfig {
            id: 1,
            lists: vec![LIST_ID.into()],
            double_optin: false,
            ..Default::default()
        },
        FormConfig {
            id: 2,
            lists: vec![LIST_ID.into()],
            redirect: Some("https://example.com/thanks".into()),
            ..Default::default()
        },
        FormConfig {
            id: 3,
            action: FormAction::Unsubscribe,
            lists: vec![LIST_ID.into()],
            ..Default::default()
        },
    ];

    let listener = TcpListener::bind(config.web.server_address()).expect("failed to bind web port.");
    // port 0 binds a random free port
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://{}:{}", &config.web.host, port);

    let services = web::Data::new(FormServices::from_config(&config).expect("failed to build services."));
    let server = signup_forms::run(listener, services).expect("failed to start server.");
    tokio::spawn(server);

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        mailchimp,
        client,
    }
}

impl TestApp {
    pub async fn post_form(&self, fields: &[(&str, &str)]) -> reqwest::Response {
        self.send_form(fields, false).await
    }

    pub async fn post_form_ajax(&self, fields: &[(&str, &str)]) -> reqwest::Response {
        self.send_form(fields, true).await
    }

    async fn send_form(&self, fields: &[(&str, &str)], ajax: bool) -> reqwest::Response {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let mut request = self
            .client
            .post(format!("{}/forms", self.address))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body);
        if ajax {
            request = request.header("X-Requested-With", "XMLHttpRequest");
        }
        request.send().await.expect("failed to execute request.")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("failed to execute request.")
    }
}

pub fn member_json(email: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "8a25ff1d98",
        "email_address": email,
        "status": status,
        "timestamp_signup": "2024-05-01T12:00:00+00:00",
        "last_changed": "2024-05-01T12:00:00+00:00",
    })
}
