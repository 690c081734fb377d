//! End-to-end lifecycle tests against a mocked management API
//!
//! Each test drives a [`Lifecycle`] for one resource kind and checks both the
//! calls that reach the server and the reported outcome.

use idpsync::mgmt::{ClientSettings, Credentials, Deadline, ManagementClient};
use idpsync::resource::{ConnectionKind, Lifecycle, LogStreamKind, ReadOutcome, RoleKind, UserKind};
use idpsync::state::{tree_from_json, ConfigValue, Tree};
use idpsync::SyncError;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{any, body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ManagementClient {
    let mut settings = ClientSettings::new(
        &format!("{}/api/v2", server.uri()),
        &format!("{}/oauth/token", server.uri()),
    )
    .unwrap();
    settings.rate_limit_fallback = Duration::from_millis(10);
    ManagementClient::new(settings, Credentials::StaticToken("test-token".into())).unwrap()
}

fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(10))
}

fn tree(value: Value) -> Tree {
    tree_from_json(value).unwrap()
}

fn sms_connection() -> Tree {
    tree(json!({
        "name": "sms-login",
        "strategy": "sms",
        "options": {
            "twilio_sid": "AC1",
            "twilio_token": "secret",
            "totp": {"time_step": 300, "length": 6},
        },
    }))
}

fn sms_response() -> Value {
    json!({
        "id": "con_1",
        "name": "sms-login",
        "strategy": "sms",
        "options": {
            "twilio_sid": "AC1",
            "totp": {"time_step": 300, "length": 6},
        },
    })
}

fn role(permissions: Value) -> Tree {
    tree(json!({"name": "admin", "permissions": permissions}))
}

fn permission(name: &str) -> Value {
    json!({"resource_server_identifier": "https://api", "name": name})
}

mod connection_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_posts_payload_and_reads_back() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/connections"))
            .and(body_json(json!({
                "name": "sms-login",
                "strategy": "sms",
                "options": {
                    "twilio_sid": "AC1",
                    "twilio_token": "secret",
                    "totp": {"time_step": 300, "length": 6},
                },
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(sms_response()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sms_response()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let desired = sms_connection();
        let outcome = Lifecycle::new(&client, &ConnectionKind)
            .create(&desired, deadline())
            .await;

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert_eq!(outcome.identity.as_deref(), Some("con_1"));
        assert!(outcome.applied.contains("options"));

        let state = outcome.state.unwrap();
        let options = state["options"].as_map().unwrap();
        // Never returned by the service; kept from the declaration
        assert_eq!(options["twilio_token"], ConfigValue::from("secret"));
        assert_eq!(state["strategy"], ConfigValue::from("sms"));
    }

    #[tokio::test]
    async fn test_rate_limited_create_still_completes() {
        let server = MockServer::start().await;
        let reset = (chrono::Utc::now().timestamp() + 2).to_string();

        Mock::given(method("POST"))
            .and(path("/api/v2/connections"))
            .respond_with(ResponseTemplate::new(429).insert_header("x-ratelimit-reset", reset.as_str()))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/connections"))
            .respond_with(ResponseTemplate::new(201).set_body_json(sms_response()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sms_response()))
            .mount(&server)
            .await;

        let client = client(&server);
        let started = std::time::Instant::now();
        let outcome = Lifecycle::new(&client, &ConnectionKind)
            .create(&sms_connection(), deadline())
            .await;
        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert_eq!(outcome.identity.as_deref(), Some("con_1"));
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_unknown_strategy_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let desired = tree(json!({"name": "x", "strategy": "carrier-pigeon", "options": {}}));
        let outcome = Lifecycle::new(&client, &ConnectionKind)
            .create(&desired, deadline())
            .await;

        assert!(outcome.identity.is_none());
        assert!(matches!(
            outcome.error,
            Some(SyncError::UnsupportedVariant { ref discriminant, .. }) if discriminant == "carrier-pigeon"
        ));
    }

    #[tokio::test]
    async fn test_unchanged_update_skips_patch() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sms_response()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let declared = sms_connection();
        let outcome = Lifecycle::new(&client, &ConnectionKind)
            .update("con_1", &declared, &declared, deadline())
            .await;

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert!(outcome.applied.is_empty());
        assert!(outcome.state.is_some());
    }

    #[tokio::test]
    async fn test_update_patches_changed_options_only() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/api/v2/connections/con_1"))
            .and(body_json(json!({"options": {"twilio_token": "rotated"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(sms_response()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sms_response()))
            .mount(&server)
            .await;

        let previous = sms_connection();
        let desired = tree(json!({
            "name": "sms-login",
            "strategy": "sms",
            "options": {
                "twilio_sid": "AC1",
                "twilio_token": "rotated",
                "totp": {"time_step": 300, "length": 6},
            },
        }));

        let client = client(&server);
        let outcome = Lifecycle::new(&client, &ConnectionKind)
            .update("con_1", &previous, &desired, deadline())
            .await;

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert_eq!(outcome.applied.iter().collect::<Vec<_>>(), vec!["options"]);
    }

    #[tokio::test]
    async fn test_strategy_change_requires_replacement() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let previous = sms_connection();
        let desired = tree(json!({"name": "sms-login", "strategy": "email", "options": {}}));

        let client = client(&server);
        let outcome = Lifecycle::new(&client, &ConnectionKind)
            .update("con_1", &previous, &desired, deadline())
            .await;
        assert!(matches!(
            outcome.error,
            Some(SyncError::ReplacementRequired { ref field }) if field == "strategy"
        ));
    }

    #[tokio::test]
    async fn test_read_missing_connection_is_gone() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/connections/con_gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "statusCode": 404,
                "error": "Not Found",
                "message": "The connection does not exist",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let outcome = Lifecycle::new(&client, &ConnectionKind)
            .read("con_gone", &Tree::new(), deadline())
            .await
            .unwrap();
        assert_eq!(outcome, ReadOutcome::Gone);
    }

    #[tokio::test]
    async fn test_delete_of_missing_connection_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v2/connections/con_gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        Lifecycle::new(&client, &ConnectionKind)
            .delete("con_gone", deadline())
            .await
            .unwrap();
    }
}

mod role_tests {
    use super::*;

    fn role_response(id: &str) -> Value {
        json!({"id": id, "name": "admin", "description": null})
    }

    #[tokio::test]
    async fn test_permission_removal_not_found_counts_as_done() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/v2/roles/rol_1/permissions"))
            .and(body_json(json!({"permissions": [
                {"resource_server_identifier": "https://api", "permission_name": "read:a"}
            ]})))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/roles/rol_1/permissions"))
            .and(body_json(json!({"permissions": [
                {"resource_server_identifier": "https://api", "permission_name": "read:c"}
            ]})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/roles/rol_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(role_response("rol_1")))
            .expect(1)
            .mount(&server)
            .await;
        // Name and description did not change
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let previous = role(json!([permission("read:a"), permission("read:b")]));
        let desired = role(json!([permission("read:b"), permission("read:c")]));

        let client = client(&server);
        let outcome = Lifecycle::new(&client, &RoleKind)
            .update("rol_1", &previous, &desired, deadline())
            .await;

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert!(outcome.applied.contains("permissions"));
        let state = outcome.state.unwrap();
        assert_eq!(state["permissions"], desired["permissions"]);
    }

    #[tokio::test]
    async fn test_failed_addition_keeps_identity_and_partial_commit() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/roles"))
            .and(body_json(json!({"name": "admin"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(role_response("rol_9")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/roles/rol_9/permissions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "Resource server https://api does not exist",
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(role_response("rol_9")))
            .expect(0)
            .mount(&server)
            .await;

        let desired = role(json!([permission("read:a")]));
        let client = client(&server);
        let outcome = Lifecycle::new(&client, &RoleKind)
            .create(&desired, deadline())
            .await;

        assert!(!outcome.is_complete());
        assert_eq!(outcome.identity.as_deref(), Some("rol_9"));
        assert!(outcome.applied.contains("name"));
        assert!(!outcome.applied.contains("permissions"));
        assert!(outcome.state.is_none());

        let committed = outcome.committed_tree(None, &desired);
        assert_eq!(committed["name"], ConfigValue::from("admin"));
        assert!(!committed.contains_key("permissions"));

        let report = outcome.to_json();
        assert_eq!(report["identity"], "rol_9");
        assert_eq!(report["complete"], false);
    }

    #[tokio::test]
    async fn test_addition_not_found_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/roles/rol_1/permissions"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let previous = role(json!([]));
        let desired = role(json!([permission("read:a")]));
        let client = client(&server);
        let outcome = Lifecycle::new(&client, &RoleKind)
            .update("rol_1", &previous, &desired, deadline())
            .await;

        assert!(outcome.error.as_ref().is_some_and(SyncError::is_not_found));
        assert_eq!(outcome.identity.as_deref(), Some("rol_1"));
    }
}

mod user_tests {
    use super::*;

    fn user_response(email: &str) -> Value {
        json!({
            "user_id": "auth0|abc",
            "email": email,
            "identities": [{"connection": "db", "provider": "auth0"}],
        })
    }

    #[tokio::test]
    async fn test_email_change_omits_connection() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/api/v2/users/auth0%7Cabc"))
            .and(body_json(json!({"email": "new@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_response("new@example.com")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/users/auth0%7Cabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_response("new@example.com")))
            .expect(1)
            .mount(&server)
            .await;

        let previous = tree(json!({"connection": "db", "email": "old@example.com"}));
        let desired = tree(json!({"connection": "db", "email": "new@example.com"}));
        let client = client(&server);
        let outcome = Lifecycle::new(&client, &UserKind)
            .update("auth0|abc", &previous, &desired, deadline())
            .await;

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        let state = outcome.state.unwrap();
        assert_eq!(state["connection"], ConfigValue::from("db"));
        assert_eq!(state["email"], ConfigValue::from("new@example.com"));
    }

    #[tokio::test]
    async fn test_username_change_carries_connection() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/api/v2/users/auth0%7Cabc"))
            .and(body_partial_json(json!({"username": "newname", "connection": "db"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_response("a@example.com")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/users/auth0%7Cabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_response("a@example.com")))
            .mount(&server)
            .await;

        let previous = tree(json!({"connection": "db", "email": "a@example.com", "username": "old"}));
        let desired = tree(json!({"connection": "db", "email": "a@example.com", "username": "newname"}));
        let client = client(&server);
        let outcome = Lifecycle::new(&client, &UserKind)
            .update("auth0|abc", &previous, &desired, deadline())
            .await;

        assert!(outcome.is_complete(), "{:?}", outcome.error);
        assert_eq!(outcome.applied.iter().collect::<Vec<_>>(), vec!["username"]);
    }
}

mod log_stream_tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_sink_field_change_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let previous = tree(json!({
            "name": "aws",
            "type": "eventbridge",
            "sink": {"aws_account_id": "123", "aws_region": "us-east-1"},
        }));
        let desired = tree(json!({
            "name": "aws",
            "type": "eventbridge",
            "sink": {"aws_account_id": "123", "aws_region": "eu-west-1"},
        }));
        let client = client(&server);
        let outcome = Lifecycle::new(&client, &LogStreamKind)
            .update("lst_1", &previous, &desired, deadline())
            .await;

        assert!(matches!(
            outcome.error,
            Some(SyncError::ReplacementRequired { ref field }) if field == "sink.aws_region"
        ));
        assert!(outcome.applied.is_empty());
    }
}
