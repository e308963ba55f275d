use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use serde_json::json;

use sotaup::{
    client::{Client, ClientConfig},
    error::Error,
    http::{HttpRequest, HttpResponse, RequestBody, Transport},
    record::{Activation, Chase, Qso},
};

/// Plays back scripted responses and records every outgoing request.
struct ScriptedTransport {
    responses: VecDeque<Result<HttpResponse, Error>>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

impl Transport for ScriptedTransport {
    fn post(&mut self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        self.seen.lock().expect("lock").push(request.clone());
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(Error::Server("script exhausted".to_string())))
    }
}

fn transport(
    responses: Vec<Result<HttpResponse, Error>>,
) -> (Box<ScriptedTransport>, Arc<Mutex<Vec<HttpRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let scripted = ScriptedTransport {
        responses: responses.into(),
        seen: Arc::clone(&seen),
    };
    (Box::new(scripted), seen)
}

fn config() -> ClientConfig {
    ClientConfig {
        client_id: "test".to_string(),
        username: "test_username".to_string(),
        password: "test_password".to_string(),
        auth_base: "https://sso.test/openid-connect".to_string(),
        api_base: "https://api.test".to_string(),
    }
}

fn json_response(status: u16, body: serde_json::Value) -> Result<HttpResponse, Error> {
    Ok(HttpResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: body.to_string(),
    })
}

fn text_response(status: u16, body: &str) -> Result<HttpResponse, Error> {
    Ok(HttpResponse {
        status,
        content_type: None,
        body: body.to_string(),
    })
}

fn token_ok() -> Result<HttpResponse, Error> {
    json_response(
        200,
        json!({
            "access_token": "test_access_token",
            "refresh_token": "test_refresh_token",
        }),
    )
}

fn logout_ok() -> Result<HttpResponse, Error> {
    text_response(204, "")
}

fn s2s_activation() -> Activation {
    let date = NaiveDate::from_ymd_opt(2025, 5, 29).expect("valid date");
    let mut qso = Qso::new(date);
    qso.time = "23:23".to_string();
    qso.callsign = "W1AW".to_string();
    qso.s2s_summit_code = "JA/NN-181".to_string();
    qso.mode = "CW".to_string();
    qso.band = "14.310MHz".to_string();

    let mut activation = Activation::new(date);
    activation.summit = "W3/PW-024".to_string();
    activation.own_callsign = "W0KEH".to_string();
    activation.qsos = vec![qso];
    activation
}

#[test]
fn login_posts_password_grant_form_to_token_endpoint() {
    let (transport, seen) = transport(vec![token_ok(), logout_ok()]);
    let client = Client::login_with(config(), transport).expect("login");
    drop(client);

    let seen = seen.lock().expect("lock");
    let login = &seen[0];
    assert_eq!(login.url, "https://sso.test/openid-connect/token");
    assert_eq!(login.bearer, None);
    assert_eq!(
        login.body,
        RequestBody::Form(vec![
            ("client_id", "test".to_string()),
            ("grant_type", "password".to_string()),
            ("username", "test_username".to_string()),
            ("password", "test_password".to_string()),
        ])
    );
}

#[test]
fn missing_config_parameters_fail_before_any_request() {
    for (field, expected) in [
        ("client_id", Error::InvalidConfiguration("client_id")),
        ("username", Error::InvalidConfiguration("username")),
        ("password", Error::InvalidConfiguration("password")),
    ] {
        let mut cfg = config();
        match field {
            "client_id" => cfg.client_id.clear(),
            "username" => cfg.username.clear(),
            _ => cfg.password.clear(),
        }

        let (transport, seen) = transport(vec![]);
        let err = Client::login_with(cfg, transport).expect_err("must fail");
        assert_eq!(err, expected);
        assert!(seen.lock().expect("lock").is_empty());
    }
}

#[test]
fn login_invalid_client_code_yields_invalid_client_id() {
    let (transport, _) = transport(vec![json_response(
        401,
        json!({"error": "invalid_client", "error_description": "Invalid client credentials"}),
    )]);
    let err = Client::login_with(config(), transport).expect_err("must fail");
    assert_eq!(
        err,
        Error::InvalidClientId("Invalid client credentials".to_string())
    );
}

#[test]
fn login_other_401_code_yields_access_denied() {
    let (transport, _) = transport(vec![json_response(
        401,
        json!({"error": "invalid_grant", "error_description": "Invalid user credentials"}),
    )]);
    let err = Client::login_with(config(), transport).expect_err("must fail");
    assert_eq!(
        err,
        Error::AccessDenied("Invalid user credentials".to_string())
    );
}

#[test]
fn login_non_401_failure_yields_server_error_with_detail() {
    let (transport, _) = transport(vec![json_response(
        500,
        json!({"error": "server_error", "error_description": "boom"}),
    )]);
    let err = Client::login_with(config(), transport).expect_err("must fail");
    assert_eq!(err, Error::Server("(server_error) boom".to_string()));
}

#[test]
fn login_unexpected_content_type_yields_server_error() {
    let (transport, _) = transport(vec![Ok(HttpResponse {
        status: 200,
        content_type: Some("text/html; charset=utf-8".to_string()),
        body: "<html>login page</html>".to_string(),
    })]);
    let err = Client::login_with(config(), transport).expect_err("must fail");
    match err {
        Error::Server(message) => assert!(message.contains("unexpected content type")),
        other => panic!("expected server error, got {other:?}"),
    }
}

#[test]
fn login_unparseable_failure_body_surfaces_raw_body() {
    let (transport, _) = transport(vec![Ok(HttpResponse {
        status: 502,
        content_type: Some("application/json".to_string()),
        body: "gateway fell over".to_string(),
    })]);
    let err = Client::login_with(config(), transport).expect_err("must fail");
    assert_eq!(err, Error::Server("gateway fell over".to_string()));
}

#[test]
fn login_transport_failure_surfaces_as_server_error() {
    let (transport, _) = transport(vec![Err(Error::Server(
        "transport failure: connection refused".to_string(),
    ))]);
    let err = Client::login_with(config(), transport).expect_err("must fail");
    assert!(matches!(err, Error::Server(_)));
}

#[test]
fn upload_posts_payload_with_bearer_token() {
    let (transport, seen) = transport(vec![token_ok(), text_response(200, ""), logout_ok()]);
    let mut client = Client::login_with(config(), transport).expect("login");

    client.add_activation(s2s_activation());
    client.add_chase(Chase::new(
        NaiveDate::from_ymd_opt(2025, 5, 28).expect("valid date"),
    ));
    client.upload().expect("upload");

    let seen = seen.lock().expect("lock");
    let upload = &seen[1];
    assert_eq!(upload.url, "https://api.test/uploads");
    assert_eq!(upload.bearer, Some("test_access_token".to_string()));

    let RequestBody::Json(body) = &upload.body else {
        panic!("upload body must be json");
    };
    assert_eq!(body["activations"][0]["ownCallsign"], "W0KEH");
    assert_eq!(body["activations"][0]["date"], "29/05/2025");
    assert_eq!(body["s2s"][0]["s2sSummitCode"], "JA/NN-181");
    assert_eq!(body["s2s"][0]["summitCode"], "W3/PW-024");
    assert_eq!(body["chases"][0]["date"], "28/05/2025");

    // Success does not clear the pending records.
    assert_eq!(client.pending().activation_count(), 1);
    assert_eq!(client.pending().chase_count(), 1);
}

#[test]
fn upload_401_and_403_yield_access_denied_with_body() {
    for status in [401u16, 403] {
        let (transport, _) = transport(vec![
            token_ok(),
            text_response(status, "token expired"),
            logout_ok(),
        ]);
        let mut client = Client::login_with(config(), transport).expect("login");
        client.add_activation(s2s_activation());

        let err = client.upload().expect_err("must fail");
        assert_eq!(err, Error::AccessDenied("token expired".to_string()));
    }
}

#[test]
fn upload_other_failure_yields_server_error_with_body() {
    let (transport, _) = transport(vec![
        token_ok(),
        text_response(500, "database busy"),
        logout_ok(),
    ]);
    let mut client = Client::login_with(config(), transport).expect("login");
    client.add_activation(s2s_activation());

    let err = client.upload().expect_err("must fail");
    assert_eq!(err, Error::Server("database busy".to_string()));
}

#[test]
fn failed_upload_keeps_records_and_reissues_identical_body() {
    let (transport, seen) = transport(vec![
        token_ok(),
        text_response(500, "database busy"),
        text_response(200, ""),
        logout_ok(),
    ]);
    let mut client = Client::login_with(config(), transport).expect("login");
    client.add_activation(s2s_activation());

    client.upload().expect_err("first attempt fails");
    client.upload().expect("second attempt succeeds");

    let seen = seen.lock().expect("lock");
    assert_eq!(seen[1].body, seen[2].body);
}

#[test]
fn drop_issues_best_effort_logout() {
    let (transport, seen) = transport(vec![token_ok(), logout_ok()]);
    let client = Client::login_with(config(), transport).expect("login");
    drop(client);

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 2);
    let logout = &seen[1];
    assert_eq!(logout.url, "https://sso.test/openid-connect/logout");
    assert_eq!(logout.bearer, Some("test_access_token".to_string()));
    assert_eq!(
        logout.body,
        RequestBody::Form(vec![
            ("client_id", "test".to_string()),
            ("refresh_token", "test_refresh_token".to_string()),
        ])
    );
}

#[test]
fn explicit_logout_suppresses_teardown_attempt() {
    let (transport, seen) = transport(vec![token_ok(), logout_ok()]);
    let client = Client::login_with(config(), transport).expect("login");
    client.logout();

    assert_eq!(seen.lock().expect("lock").len(), 2);
}

#[test]
fn logout_failure_is_swallowed() {
    let (transport, seen) = transport(vec![
        token_ok(),
        Err(Error::Server("transport failure: connection refused".to_string())),
    ]);
    let client = Client::login_with(config(), transport).expect("login");
    client.logout();

    assert_eq!(seen.lock().expect("lock").len(), 2);
}
