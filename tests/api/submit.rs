use wiremock::{
    matchers::{any, method, path_regex},
    Mock, ResponseTemplate,
};

use crate::helper::{
    member_json, spawn_app, TestApp, REDIRECT_FORM, SUBSCRIBE_FORM, UNSUBSCRIBE_FORM,
};

const MEMBER_PATH: &str = r"^/lists/a1b2c3d4e5/members/[0-9a-f]{32}$";
const EMAIL: &str = "ursula@example.com";

async fn mount_lookup(app: &TestApp, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path_regex(MEMBER_PATH))
        .respond_with(response)
        .mount(&app.mailchimp)
        .await;
}

async fn mount_put(app: &TestApp, status: &str) {
    Mock::given(method("PUT"))
        .and(path_regex(MEMBER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_json(EMAIL, status)))
        .expect(1)
        .mount(&app.mailchimp)
        .await;
}

async fn json(res: reqwest::Response) -> serde_json::Value {
    assert_eq!(200, res.status().as_u16());
    res.json().await.expect("response is not json.")
}

#[tokio::test]
async fn request_without_form_id_is_rejected() {
    let app = spawn_app().await;

    let datas = [
        (vec![("EMAIL", EMAIL)], "form id is missing."),
        (vec![("_mc4wp_form_id", ""), ("EMAIL", EMAIL)], "form id is empty."),
        (vec![("_mc4wp_form_id", "99"), ("EMAIL", EMAIL)], "form does not exist."),
    ];
    for (fields, payload) in datas {
        let res = app.post_form(&fields).await;
        assert_eq!(400, res.status().as_u16(), "{payload}");
    }
}

#[tokio::test]
async fn valid_subscribe() {
    let app = spawn_app().await;
    mount_lookup(&app, ResponseTemplate::new(404)).await;
    mount_put(&app, "subscribed").await;

    let res = app
        .post_form(&[
            ("_mc4wp_form_id", SUBSCRIBE_FORM),
            ("email", EMAIL),
            ("fname", "Ursula"),
        ])
        .await;
    let body = json(res).await;
    assert_eq!(true, body["success"]);
    assert_eq!(1, body["form_id"]);
    assert_eq!("subscribed", body["messages"][0]["key"]);
    assert_eq!("success", body["messages"][0]["type"]);

    let requests = app.mailchimp.received_requests().await.unwrap();
    let put = requests.iter().find(|r| r.method.as_str() == "PUT").unwrap();
    let member: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
    assert_eq!(EMAIL, member["email_address"]);
    assert_eq!("subscribed", member["status"]);
    assert_eq!("Ursula", member["merge_fields"]["FNAME"]);
    assert_eq!("127.0.0.1", member["ip_signup"]);
}

#[tokio::test]
async fn invalid_subscribe_never_reaches_mailchimp() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&app.mailchimp)
        .await;

    let res = app
        .post_form(&[("_mc4wp_form_id", SUBSCRIBE_FORM), ("email", "not-an-email")])
        .await;
    let body = json(res).await;
    assert_eq!(false, body["success"]);
    assert_eq!(serde_json::json!(["invalid_email"]), body["errors"]);
}

#[tokio::test]
async fn already_subscribed_is_a_notice() {
    let app = spawn_app().await;
    mount_lookup(
        &app,
        ResponseTemplate::new(200).set_body_json(member_json(EMAIL, "subscribed")),
    )
    .await;

    let res = app
        .post_form(&[("_mc4wp_form_id", SUBSCRIBE_FORM), ("email", EMAIL)])
        .await;
    let body = json(res).await;
    assert_eq!(serde_json::json!(["already_subscribed"]), body["errors"]);
    assert_eq!("notice", body["messages"][0]["type"]);
}

#[tokio::test]
async fn successful_submission_redirects() {
    let app = spawn_app().await;
    mount_lookup(&app, ResponseTemplate::new(404)).await;
    Mock::given(method("PUT"))
        .and(path_regex(MEMBER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_json(EMAIL, "pending")))
        .expect(2)
        .mount(&app.mailchimp)
        .await;
    let fields = [("_mc4wp_form_id", REDIRECT_FORM), ("email", EMAIL)];

    let res = app.post_form(&fields).await;
    assert_eq!(303, res.status().as_u16());
    assert_eq!(
        "https://example.com/thanks",
        res.headers().get("Location").unwrap().to_str().unwrap()
    );

    let res = app.post_form_ajax(&fields).await;
    let body = json(res).await;
    assert_eq!(true, body["success"]);
}

#[tokio::test]
async fn unsubscribe_unknown_address_is_not_subscribed() {
    let app = spawn_app().await;
    mount_lookup(&app, ResponseTemplate::new(404)).await;

    let res = app
        .post_form(&[("_mc4wp_form_id", UNSUBSCRIBE_FORM), ("email", EMAIL)])
        .await;
    let body = json(res).await;
    assert_eq!(false, body["success"]);
    assert_eq!(serde_json::json!(["not_subscribed"]), body["errors"]);
}

#[tokio::test]
async fn unsubscribe_subscribed_address() {
    let app = spawn_app().await;
    mount_lookup(
        &app,
        ResponseTemplate::new(200).set_body_json(member_json(EMAIL, "subscribed")),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path_regex(MEMBER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(member_json(EMAIL, "unsubscribed")))
        .expect(1)
        .mount(&app.mailchimp)
        .await;

    let res = app
        .post_form(&[("_mc4wp_form_id", UNSUBSCRIBE_FORM), ("email", EMAIL)])
        .await;
    let body = json(res).await;
    assert_eq!(true, body["success"]);
    assert_eq!("unsubscribed", body["messages"][0]["key"]);
}
