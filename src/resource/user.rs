//! Users and their role assignments

use super::kind::{to_payload, RelationshipSync, ResourceKind};
use crate::error::{Result, SyncError};
use crate::state::{Condition, Fields, Flattener, Patch, Tree};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const ROLES: &str = "roles";

/// Fields whose mutation the API only accepts together with `connection`
const CONNECTION_BOUND: &[&str] = &[
    "username",
    "password",
    "email_verified",
    "phone_verified",
    "verify_email",
];

#[derive(Debug, Serialize)]
struct UserPayload {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    connection: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    email: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    username: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    phone_number: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    password: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    nickname: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    given_name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    family_name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    picture: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    email_verified: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    phone_verified: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    verify_email: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    blocked: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    user_metadata: Patch<Tree>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    app_metadata: Patch<Tree>,
}

#[derive(Debug, Deserialize)]
struct Identity {
    connection: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    identities: Vec<Identity>,
    #[serde(default)]
    email: Patch<String>,
    #[serde(default)]
    username: Patch<String>,
    #[serde(default)]
    phone_number: Patch<String>,
    #[serde(default)]
    name: Patch<String>,
    #[serde(default)]
    nickname: Patch<String>,
    #[serde(default)]
    given_name: Patch<String>,
    #[serde(default)]
    family_name: Patch<String>,
    #[serde(default)]
    picture: Patch<String>,
    #[serde(default)]
    email_verified: Patch<bool>,
    #[serde(default)]
    phone_verified: Patch<bool>,
    #[serde(default)]
    blocked: Patch<bool>,
    #[serde(default)]
    user_metadata: Patch<Tree>,
    #[serde(default)]
    app_metadata: Patch<Tree>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserKind;

impl ResourceKind for UserKind {
    fn name(&self) -> &'static str {
        "user"
    }

    fn collection(&self) -> &'static str {
        "users"
    }

    fn relationship_fields(&self) -> &'static [&'static str] {
        &[ROLES]
    }

    fn payload(&self, fields: &Fields<'_>) -> Result<Value> {
        let needs_connection = Condition::IsNew.or(Condition::any_changed(CONNECTION_BOUND));
        let send_verify_email = Condition::IsNew
            .or(Condition::changed("email"))
            .or(Condition::changed("verify_email"));
        // Write-only trigger, so there is nothing to clear
        let verify_email = match fields.bool_when("verify_email", &send_verify_email)? {
            Patch::Null => Patch::Absent,
            other => other,
        };

        to_payload(&UserPayload {
            connection: fields.string_when("connection", &needs_connection)?,
            email: fields.string("email")?,
            username: fields.string("username")?,
            phone_number: fields.string("phone_number")?,
            password: fields.string("password")?,
            name: fields.string("name")?,
            nickname: fields.string("nickname")?,
            given_name: fields.string("given_name")?,
            family_name: fields.string("family_name")?,
            picture: fields.string("picture")?,
            email_verified: fields.bool("email_verified")?,
            phone_verified: fields.bool("phone_verified")?,
            verify_email,
            blocked: fields.bool("blocked")?,
            user_metadata: fields.map("user_metadata")?,
            app_metadata: fields.map("app_metadata")?,
        })
    }

    fn identity(&self, created: &Value) -> Result<String> {
        created
            .get("user_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SyncError::MissingField("user_id".to_string()))
    }

    fn flatten(&self, remote: Value, local: &Tree) -> Result<Tree> {
        let response: UserResponse = serde_json::from_value(remote)?;
        let mut out = Flattener::new(local);
        match response.identities.into_iter().next() {
            Some(identity) => out.put("connection", &Patch::Value(identity.connection)),
            None => out.put_write_only("connection"),
        };
        Ok(out
            .put("email", &response.email)
            .put("username", &response.username)
            .put("phone_number", &response.phone_number)
            .put_write_only("password")
            .put("name", &response.name)
            .put("nickname", &response.nickname)
            .put("given_name", &response.given_name)
            .put("family_name", &response.family_name)
            .put("picture", &response.picture)
            .put("email_verified", &response.email_verified)
            .put("phone_verified", &response.phone_verified)
            .put_write_only("verify_email")
            .put("blocked", &response.blocked)
            .put("user_metadata", &response.user_metadata)
            .put("app_metadata", &response.app_metadata)
            .put_write_only(ROLES)
            .finish())
    }

    fn relationships(&self, fields: &Fields<'_>) -> Result<Vec<RelationshipSync>> {
        let change = fields.string_set_change(ROLES)?;
        Ok(
            RelationshipSync::from_change(ROLES, change, |roles| json!({ "roles": roles }))
                .into_iter()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{tree_from_json, ConfigValue};

    fn user(overrides: Value) -> Tree {
        let mut base = json!({
            "connection": "Username-Password-Authentication",
            "email": "ada@example.com",
            "password": "hunter2!",
            "nickname": "ada",
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        tree_from_json(base).unwrap()
    }

    #[test]
    fn test_create_sends_connection() {
        let desired = user(json!({}));
        let payload = UserKind.payload(&Fields::new(None, &desired)).unwrap();
        assert_eq!(payload["connection"], json!("Username-Password-Authentication"));
        assert_eq!(payload["password"], json!("hunter2!"));
    }

    #[test]
    fn test_password_change_brings_connection_along() {
        let prev = user(json!({}));
        let next = user(json!({"password": "correct horse"}));
        let payload = UserKind.payload(&Fields::new(Some(&prev), &next)).unwrap();
        assert_eq!(
            payload,
            json!({
                "connection": "Username-Password-Authentication",
                "password": "correct horse",
            })
        );
    }

    #[test]
    fn test_profile_change_leaves_connection_out() {
        let prev = user(json!({}));
        let next = user(json!({"nickname": "countess"}));
        let payload = UserKind.payload(&Fields::new(Some(&prev), &next)).unwrap();
        assert_eq!(payload, json!({"nickname": "countess"}));
    }

    #[test]
    fn test_verify_email_follows_email_change() {
        let prev = user(json!({"verify_email": true}));
        let unchanged_email = user(json!({"verify_email": true, "nickname": "x"}));
        let payload = UserKind
            .payload(&Fields::new(Some(&prev), &unchanged_email))
            .unwrap();
        assert!(payload.get("verify_email").is_none());

        let new_email = user(json!({"verify_email": true, "email": "ada@lovelace.dev"}));
        let payload = UserKind.payload(&Fields::new(Some(&prev), &new_email)).unwrap();
        assert_eq!(payload["verify_email"], json!(true));
        assert_eq!(payload["email"], json!("ada@lovelace.dev"));
    }

    #[test]
    fn test_verify_email_change_alone_is_sent() {
        let prev = user(json!({"verify_email": false}));
        let next = user(json!({"verify_email": true}));
        let payload = UserKind.payload(&Fields::new(Some(&prev), &next)).unwrap();
        assert_eq!(
            payload,
            json!({"connection": "Username-Password-Authentication", "verify_email": true})
        );

        let cleared = user(json!({}));
        let payload = UserKind.payload(&Fields::new(Some(&next), &cleared)).unwrap();
        assert_eq!(payload, json!({"connection": "Username-Password-Authentication"}));
    }

    #[test]
    fn test_identity_is_user_id() {
        let created = json!({"user_id": "auth0|abc123", "email": "ada@example.com"});
        assert_eq!(UserKind.identity(&created).unwrap(), "auth0|abc123");
        assert!(UserKind.identity(&json!({"id": "x"})).is_err());
    }

    #[test]
    fn test_path_encodes_pipe() {
        assert_eq!(UserKind.path("auth0|abc123"), "users/auth0%7Cabc123");
    }

    #[test]
    fn test_role_assignments() {
        let prev = user(json!({"roles": ["rol_a", "rol_b"]}));
        let next = user(json!({"roles": ["rol_b", "rol_c"]}));
        let syncs = UserKind
            .relationships(&Fields::new(Some(&prev), &next))
            .unwrap();
        assert_eq!(syncs[0].path(&UserKind.path("auth0|abc")), "users/auth0%7Cabc/roles");
        assert_eq!(syncs[0].additions, Some(json!({"roles": ["rol_c"]})));
        assert_eq!(syncs[0].removals, Some(json!({"roles": ["rol_a"]})));
    }

    #[test]
    fn test_flatten_takes_connection_from_identity() {
        let local = user(json!({"roles": ["rol_a"]}));
        let remote = json!({
            "user_id": "auth0|abc",
            "email": "ada@example.com",
            "nickname": "ada",
            "identities": [{"connection": "Username-Password-Authentication", "provider": "auth0"}],
        });
        let tree = UserKind.flatten(remote, &local).unwrap();
        assert_eq!(tree, local);
        assert_eq!(tree["password"], ConfigValue::from("hunter2!"));
    }
}
