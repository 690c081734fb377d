//! Social identity provider strategies

use super::scopes::{expand_scope_string, parse_scope_string, ScopeFlags, SCOPES_FIELD};
use super::ConnectionOptions;
use crate::error::Result;
use crate::resource::registry::{Member, Variant};
use crate::state::{Fields, Flattener, Patch, Tree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::marker::PhantomData;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleOAuth2Options {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub allowed_audiences: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
    #[serde(flatten)]
    pub scopes: ScopeFlags,
}

impl GoogleOAuth2Options {
    pub const SCOPES: &'static [&'static str] = &[
        "email",
        "profile",
        "calendar",
        "contacts",
        "drive",
        "gmail",
        "youtube",
        "adsense_management",
        "analytics",
        "blogger",
        "chrome_web_store",
        "coordinate",
        "document_list",
        "google_affiliate_network",
        "google_books",
        "google_cloud_storage",
        "google_plus",
        "latitude_best",
        "moderator",
        "orkut",
        "picasa_web",
        "sites",
        "spreadsheets",
        "tasks",
        "url_shortener",
        "webmaster_tools",
    ];
}

impl Variant<ConnectionOptions> for GoogleOAuth2Options {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            allowed_audiences: fields.string_set("allowed_audiences")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
            scopes: ScopeFlags::expand(fields, Self::SCOPES)?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put_set_patch("allowed_audiences", &self.allowed_audiences)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .put_set(SCOPES_FIELD, self.scopes.enabled(Self::SCOPES))
            .finish()
    }
}

/// Google Workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleAppsOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub tenant_domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain_aliases: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub api_enable_users: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(flatten)]
    pub scopes: ScopeFlags,
}

impl GoogleAppsOptions {
    pub const SCOPES: &'static [&'static str] =
        &["ext_agreed_terms", "ext_groups", "ext_is_admin", "ext_is_suspended"];
}

impl Variant<ConnectionOptions> for GoogleAppsOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            domain: fields.string("domain")?,
            tenant_domain: fields.string("tenant_domain")?,
            domain_aliases: fields.string_set("domain_aliases")?,
            api_enable_users: fields.bool("api_enable_users")?,
            icon_url: fields.string("icon_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            scopes: ScopeFlags::expand(fields, Self::SCOPES)?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put("domain", &self.domain)
            .put("tenant_domain", &self.tenant_domain)
            .put_set_patch("domain_aliases", &self.domain_aliases)
            .put("api_enable_users", &self.api_enable_users)
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set(SCOPES_FIELD, self.scopes.enabled(Self::SCOPES))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacebookOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
    #[serde(flatten)]
    pub scopes: ScopeFlags,
}

impl FacebookOptions {
    pub const SCOPES: &'static [&'static str] = &[
        "public_profile",
        "email",
        "groups_access_member_info",
        "publish_to_groups",
        "user_age_range",
        "user_birthday",
        "user_friends",
        "user_gender",
        "user_hometown",
        "user_likes",
        "user_link",
        "user_location",
        "user_photos",
        "user_posts",
        "user_videos",
    ];
}

impl Variant<ConnectionOptions> for FacebookOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
            scopes: ScopeFlags::expand(fields, Self::SCOPES)?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .put_set(SCOPES_FIELD, self.scopes.enabled(Self::SCOPES))
            .finish()
    }
}

/// Sign in with Apple. The client secret is the PEM private key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppleOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub team_id: Patch<String>,
    #[serde(rename = "kid", default, skip_serializing_if = "Patch::is_absent")]
    pub key_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(flatten)]
    pub scopes: ScopeFlags,
}

impl AppleOptions {
    pub const SCOPES: &'static [&'static str] = &["email", "name"];
}

impl Variant<ConnectionOptions> for AppleOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            team_id: fields.string("team_id")?,
            key_id: fields.string("key_id")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            scopes: ScopeFlags::expand(fields, Self::SCOPES)?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put("team_id", &self.team_id)
            .put("key_id", &self.key_id)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set(SCOPES_FIELD, self.scopes.enabled(Self::SCOPES))
            .finish()
    }
}

/// Providers sharing the plain client id/secret/scope-flag shape
pub trait SocialProvider: Debug + Clone + Default + PartialEq + 'static {
    const SCOPES: &'static [&'static str];
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedIn;

impl SocialProvider for LinkedIn {
    const SCOPES: &'static [&'static str] = &["email", "profile", "basic_profile"];
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GitHub;

impl SocialProvider for GitHub {
    const SCOPES: &'static [&'static str] = &[
        "email",
        "follow",
        "read_user",
        "read_org",
        "write_org",
        "admin_org",
        "read_repo_hook",
        "write_repo_hook",
        "admin_repo_hook",
        "read_public_key",
        "write_public_key",
        "admin_public_key",
        "gist",
        "notifications",
        "repo",
        "public_repo",
        "repo_status",
        "repo_deployment",
        "delete_repo",
    ];
}

/// Microsoft Account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowsLive;

impl SocialProvider for WindowsLive {
    const SCOPES: &'static [&'static str] = &[
        "signin",
        "offline_access",
        "graph_user",
        "graph_user_read_all",
        "graph_mail",
        "graph_calendars",
        "graph_contacts",
        "graph_files",
        "graph_notes",
    ];
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bitbucket;

impl SocialProvider for Bitbucket {
    const SCOPES: &'static [&'static str] = &["profile", "email"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SocialOptions<P: SocialProvider> {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
    #[serde(flatten)]
    pub scopes: ScopeFlags,
    #[serde(skip)]
    provider: PhantomData<P>,
}

impl<P: SocialProvider> Variant<ConnectionOptions> for SocialOptions<P>
where
    Self: Member<ConnectionOptions>,
{
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
            scopes: ScopeFlags::expand(fields, P::SCOPES)?,
            provider: PhantomData,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .put_set(SCOPES_FIELD, self.scopes.enabled(P::SCOPES))
            .finish()
    }
}

/// Generic OAuth2 provider with a space-separated `scope`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Options {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(
        rename = "authorizationURL",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub authorization_endpoint: Patch<String>,
    #[serde(rename = "tokenURL", default, skip_serializing_if = "Patch::is_absent")]
    pub token_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub scope: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub scripts: Patch<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub pkce_enabled: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
}

impl Variant<ConnectionOptions> for OAuth2Options {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            authorization_endpoint: fields.string("authorization_endpoint")?,
            token_endpoint: fields.string("token_endpoint")?,
            scope: expand_scope_string(fields)?,
            scripts: fields.string_map("scripts")?,
            pkce_enabled: fields.bool("pkce_enabled")?,
            icon_url: fields.string("icon_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put("authorization_endpoint", &self.authorization_endpoint)
            .put("token_endpoint", &self.token_endpoint)
            .put_set(SCOPES_FIELD, parse_scope_string(&self.scope))
            .put("scripts", &self.scripts)
            .put("pkce_enabled", &self.pkce_enabled)
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .finish()
    }
}

/// Shared by `salesforce`, `salesforce-sandbox` and `salesforce-community`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesforceOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub community_base_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
}

impl Variant<ConnectionOptions> for SalesforceOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            community_base_url: fields.string("community_base_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put("community_base_url", &self.community_base_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{tree_from_json, ConfigValue};
    use serde_json::json;

    #[test]
    fn test_scope_flags_sit_beside_named_options() {
        let desired = tree_from_json(json!({
            "client_id": "abc",
            "client_secret": "shh",
            "scopes": ["email", "gist"],
        }))
        .unwrap();
        let options = SocialOptions::<GitHub>::expand(&Fields::new(None, &desired)).unwrap();
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"client_id": "abc", "client_secret": "shh", "email": true, "gist": true})
        );
    }

    #[test]
    fn test_scope_known_to_one_provider_only() {
        let desired = tree_from_json(json!({"scopes": ["gist"]})).unwrap();
        assert!(SocialOptions::<Bitbucket>::expand(&Fields::new(None, &desired)).is_err());
    }

    #[test]
    fn test_flatten_reads_scope_flags_and_keeps_secret() {
        let remote: FacebookOptions = serde_json::from_value(json!({
            "client_id": "abc",
            "email": true,
            "user_likes": false,
            "public_profile": true,
        }))
        .unwrap();
        let local = tree_from_json(json!({"client_secret": "shh"})).unwrap();
        let tree = remote.flatten(&local);
        assert_eq!(tree["client_secret"], ConfigValue::from("shh"));
        assert_eq!(
            tree[SCOPES_FIELD],
            ConfigValue::Set(BTreeSet::from(["email".to_string(), "public_profile".to_string()]))
        );
    }

    #[test]
    fn test_oauth2_scope_string_round_trip() {
        let desired = tree_from_json(json!({
            "authorization_endpoint": "https://idp.example/authorize",
            "scopes": ["openid", "email"],
        }))
        .unwrap();
        let options = OAuth2Options::expand(&Fields::new(None, &desired)).unwrap();
        let payload = serde_json::to_value(&options).unwrap();
        assert_eq!(
            payload,
            json!({"authorizationURL": "https://idp.example/authorize", "scope": "email openid"})
        );

        let remote: OAuth2Options = serde_json::from_value(payload).unwrap();
        let tree = remote.flatten(&desired);
        assert_eq!(tree, desired);
    }

    #[test]
    fn test_unchanged_scopes_send_no_flags() {
        let declared = tree_from_json(json!({"client_id": "a", "scopes": ["email"]})).unwrap();
        let options = AppleOptions::expand(&Fields::new(Some(&declared), &declared)).unwrap();
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({}));
    }
}
