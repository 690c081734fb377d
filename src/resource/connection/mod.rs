//! Connections: identity sources keyed by `strategy`
//!
//! The `options` object of a connection has a different shape for every
//! strategy. Each shape is a [`Variant`](crate::resource::registry::Variant)
//! of [`ConnectionOptions`] registered under its strategy name.

mod database;
mod enterprise;
mod passwordless;
pub mod scopes;
mod social;

pub use database::DatabaseOptions;
pub use enterprise::{
    AdOptions, AdfsOptions, AzureAdOptions, OidcOptions, OktaOptions, PingFederateOptions,
    SamlOptions,
};
pub use passwordless::{EmailOptions, SmsOptions};
pub use social::{
    AppleOptions, Bitbucket, FacebookOptions, GitHub, GoogleAppsOptions, GoogleOAuth2Options,
    LinkedIn, OAuth2Options, SalesforceOptions, SocialOptions, WindowsLive,
};

use super::kind::{is_empty_payload, to_payload, ResourceKind};
use super::registry::{variant_members, VariantFamily, VariantRegistry};
use crate::error::Result;
use crate::state::{Fields, Flattener, Patch, Tree};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Strategy-specific `options` object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConnectionOptions {
    Database(DatabaseOptions),
    Sms(SmsOptions),
    Email(EmailOptions),
    GoogleOAuth2(GoogleOAuth2Options),
    GoogleApps(GoogleAppsOptions),
    Facebook(FacebookOptions),
    Apple(AppleOptions),
    LinkedIn(SocialOptions<LinkedIn>),
    GitHub(SocialOptions<GitHub>),
    WindowsLive(SocialOptions<WindowsLive>),
    Bitbucket(SocialOptions<Bitbucket>),
    OAuth2(OAuth2Options),
    Salesforce(SalesforceOptions),
    AzureAd(AzureAdOptions),
    Adfs(AdfsOptions),
    Saml(SamlOptions),
    Oidc(OidcOptions),
    Okta(OktaOptions),
    Ad(AdOptions),
    PingFederate(PingFederateOptions),
}

impl VariantFamily for ConnectionOptions {
    const NAME: &'static str = "connection strategy";
}

variant_members!(ConnectionOptions {
    Database(DatabaseOptions),
    Sms(SmsOptions),
    Email(EmailOptions),
    GoogleOAuth2(GoogleOAuth2Options),
    GoogleApps(GoogleAppsOptions),
    Facebook(FacebookOptions),
    Apple(AppleOptions),
    LinkedIn(SocialOptions<LinkedIn>),
    GitHub(SocialOptions<GitHub>),
    WindowsLive(SocialOptions<WindowsLive>),
    Bitbucket(SocialOptions<Bitbucket>),
    OAuth2(OAuth2Options),
    Salesforce(SalesforceOptions),
    AzureAd(AzureAdOptions),
    Adfs(AdfsOptions),
    Saml(SamlOptions),
    Oidc(OidcOptions),
    Okta(OktaOptions),
    Ad(AdOptions),
    PingFederate(PingFederateOptions),
});

static REGISTRY: OnceLock<VariantRegistry<ConnectionOptions>> = OnceLock::new();

/// Strategy -> options handler, built on first use
pub fn registry() -> &'static VariantRegistry<ConnectionOptions> {
    REGISTRY.get_or_init(|| {
        VariantRegistry::new()
            .with::<DatabaseOptions>("auth0")
            .with::<SmsOptions>("sms")
            .with::<EmailOptions>("email")
            .with::<GoogleOAuth2Options>("google-oauth2")
            .with::<GoogleAppsOptions>("google-apps")
            .with::<FacebookOptions>("facebook")
            .with::<AppleOptions>("apple")
            .with::<SocialOptions<LinkedIn>>("linkedin")
            .with::<SocialOptions<GitHub>>("github")
            .with::<SocialOptions<WindowsLive>>("windowslive")
            .with::<SocialOptions<Bitbucket>>("bitbucket")
            .with::<OAuth2Options>("oauth2")
            .with::<SalesforceOptions>("salesforce")
            .with::<SalesforceOptions>("salesforce-sandbox")
            .with::<SalesforceOptions>("salesforce-community")
            .with::<AzureAdOptions>("waad")
            .with::<AdfsOptions>("adfs")
            .with::<SamlOptions>("samlp")
            .with::<OidcOptions>("oidc")
            .with::<OktaOptions>("okta")
            .with::<AdOptions>("ad")
            .with::<PingFederateOptions>("pingfederate")
    })
}

#[derive(Debug, Serialize)]
struct ConnectionPayload {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    strategy: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    display_name: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    is_domain_connection: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    show_as_button: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    realms: Patch<Vec<String>>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    metadata: Patch<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ConnectionOptions>,
}

#[derive(Debug, Deserialize)]
struct ConnectionResponse {
    #[serde(default)]
    name: Patch<String>,
    strategy: String,
    #[serde(default)]
    display_name: Patch<String>,
    #[serde(default)]
    is_domain_connection: Patch<bool>,
    #[serde(default)]
    show_as_button: Patch<bool>,
    #[serde(default)]
    realms: Patch<Vec<String>>,
    #[serde(default)]
    metadata: Patch<BTreeMap<String, String>>,
    #[serde(default)]
    options: Value,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionKind;

impl ResourceKind for ConnectionKind {
    fn name(&self) -> &'static str {
        "connection"
    }

    fn collection(&self) -> &'static str {
        "connections"
    }

    fn immutable_fields(&self) -> &'static [&'static str] {
        &["name", "strategy"]
    }

    fn payload(&self, fields: &Fields<'_>) -> Result<Value> {
        let strategy = fields.required_string("strategy")?;
        let handler = registry().resolve(&strategy)?;
        let options = (handler.expand)(&fields.block("options")?)?;

        to_payload(&ConnectionPayload {
            name: fields.string("name")?,
            strategy: fields.string("strategy")?,
            display_name: fields.string("display_name")?,
            is_domain_connection: fields.bool("is_domain_connection")?,
            show_as_button: fields.bool("show_as_button")?,
            realms: fields.string_list("realms")?,
            metadata: fields.string_map("metadata")?,
            options: if is_empty_payload(&options)? {
                None
            } else {
                Some(options)
            },
        })
    }

    fn flatten(&self, remote: Value, local: &Tree) -> Result<Tree> {
        let response: ConnectionResponse = serde_json::from_value(remote)?;
        let handler = registry().resolve(&response.strategy)?;
        let options = (handler.decode)(response.options)?;

        let mut out = Flattener::new(local);
        let options = (handler.flatten)(&options, out.local_block("options"))?;
        Ok(out
            .put("name", &response.name)
            .put("strategy", &Patch::Value(response.strategy))
            .put("display_name", &response.display_name)
            .put("is_domain_connection", &response.is_domain_connection)
            .put("show_as_button", &response.show_as_button)
            .put("realms", &response.realms)
            .put("metadata", &response.metadata)
            .put_block("options", options)
            .finish())
    }
}
