//! Enterprise federation strategies

use super::scopes::{expand_scope_string, parse_scope_string, ScopeFlags, SCOPES_FIELD};
use super::ConnectionOptions;
use crate::error::Result;
use crate::resource::registry::Variant;
use crate::state::{Fields, Flattener, Patch, Tree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Azure AD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureAdOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub app_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub tenant_domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain_aliases: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub waad_protocol: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub waad_common_endpoint: Patch<bool>,
    #[serde(
        rename = "useWsfed",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub use_wsfed: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub identity_api: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub max_groups_to_retrieve: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub api_enable_users: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(flatten)]
    pub scopes: ScopeFlags,
}

impl AzureAdOptions {
    pub const SCOPES: &'static [&'static str] = &[
        "basic_profile",
        "ext_profile",
        "ext_groups",
        "ext_nested_groups",
        "ext_assigned_plans",
    ];
}

impl Variant<ConnectionOptions> for AzureAdOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            app_id: fields.string("app_id")?,
            tenant_domain: fields.string("tenant_domain")?,
            domain: fields.string("domain")?,
            domain_aliases: fields.string_set("domain_aliases")?,
            waad_protocol: fields.string("waad_protocol")?,
            waad_common_endpoint: fields.bool("waad_common_endpoint")?,
            use_wsfed: fields.bool("use_wsfed")?,
            identity_api: fields.string("identity_api")?,
            max_groups_to_retrieve: fields.string("max_groups_to_retrieve")?,
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
            .put("app_id", &self.app_id)
            .put("tenant_domain", &self.tenant_domain)
            .put("domain", &self.domain)
            .put_set_patch("domain_aliases", &self.domain_aliases)
            .put("waad_protocol", &self.waad_protocol)
            .put("waad_common_endpoint", &self.waad_common_endpoint)
            .put("use_wsfed", &self.use_wsfed)
            .put("identity_api", &self.identity_api)
            .put("max_groups_to_retrieve", &self.max_groups_to_retrieve)
            .put("api_enable_users", &self.api_enable_users)
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set(SCOPES_FIELD, self.scopes.enabled(Self::SCOPES))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdfsOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub adfs_server: Patch<String>,
    #[serde(
        rename = "fedMetadataXml",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub fed_metadata_xml: Patch<String>,
    #[serde(
        rename = "signInEndpoint",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub sign_in_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub tenant_domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain_aliases: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub api_enable_users: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub should_trust_email_verified_connection: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
}

impl Variant<ConnectionOptions> for AdfsOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            adfs_server: fields.string("adfs_server")?,
            fed_metadata_xml: fields.string("fed_metadata_xml")?,
            sign_in_endpoint: fields.string("sign_in_endpoint")?,
            tenant_domain: fields.string("tenant_domain")?,
            domain_aliases: fields.string_set("domain_aliases")?,
            api_enable_users: fields.bool("api_enable_users")?,
            should_trust_email_verified_connection: fields
                .string("should_trust_email_verified_connection")?,
            icon_url: fields.string("icon_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("adfs_server", &self.adfs_server)
            .put("fed_metadata_xml", &self.fed_metadata_xml)
            .put("sign_in_endpoint", &self.sign_in_endpoint)
            .put("tenant_domain", &self.tenant_domain)
            .put_set_patch("domain_aliases", &self.domain_aliases)
            .put("api_enable_users", &self.api_enable_users)
            .put(
                "should_trust_email_verified_connection",
                &self.should_trust_email_verified_connection,
            )
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .finish()
    }
}

/// IdP-initiated login settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdpInitiated {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_protocol: Patch<String>,
    #[serde(
        rename = "client_authorizequery",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub client_authorize_query: Patch<String>,
}

impl IdpInitiated {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_protocol: fields.string("client_protocol")?,
            client_authorize_query: fields.string("client_authorize_query")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put("client_protocol", &self.client_protocol)
            .put("client_authorize_query", &self.client_authorize_query)
            .finish()
    }
}

/// Request-signing key pair; the service never returns it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigningKey {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub key: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub cert: Patch<String>,
}

impl SigningKey {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            key: fields.string("key")?,
            cert: fields.string("cert")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamlOptions {
    #[serde(
        rename = "signingCert",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub signing_cert: Patch<String>,
    #[serde(
        rename = "signInEndpoint",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub sign_in_endpoint: Patch<String>,
    #[serde(
        rename = "signOutEndpoint",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub sign_out_endpoint: Patch<String>,
    #[serde(
        rename = "disableSignout",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub disable_sign_out: Patch<bool>,
    #[serde(
        rename = "signSAMLRequest",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub sign_saml_request: Patch<bool>,
    #[serde(
        rename = "signatureAlgorithm",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub signature_algorithm: Patch<String>,
    #[serde(
        rename = "digestAlgorithm",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub digest_algorithm: Patch<String>,
    #[serde(
        rename = "protocolBinding",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub protocol_binding: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub user_id_attribute: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub debug: Patch<bool>,
    #[serde(
        rename = "idpinitiated",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub idp_initiated: Patch<IdpInitiated>,
    #[serde(rename = "fieldsMap", default, skip_serializing_if = "Patch::is_absent")]
    pub fields_map: Patch<BTreeMap<String, String>>,
    #[serde(rename = "metadataUrl", default, skip_serializing_if = "Patch::is_absent")]
    pub metadata_url: Patch<String>,
    #[serde(rename = "metadataXml", default, skip_serializing_if = "Patch::is_absent")]
    pub metadata_xml: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub signing_key: Patch<SigningKey>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub entity_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub tenant_domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain_aliases: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
}

impl Variant<ConnectionOptions> for SamlOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            signing_cert: fields.string("signing_cert")?,
            sign_in_endpoint: fields.string("sign_in_endpoint")?,
            sign_out_endpoint: fields.string("sign_out_endpoint")?,
            disable_sign_out: fields.bool("disable_sign_out")?,
            sign_saml_request: fields.bool("sign_saml_request")?,
            signature_algorithm: fields.string("signature_algorithm")?,
            digest_algorithm: fields.string("digest_algorithm")?,
            protocol_binding: fields.string("protocol_binding")?,
            user_id_attribute: fields.string("user_id_attribute")?,
            debug: fields.bool("debug")?,
            idp_initiated: fields.nested("idp_initiated", IdpInitiated::expand)?,
            fields_map: fields.string_map("fields_map")?,
            metadata_url: fields.string("metadata_url")?,
            metadata_xml: fields.string("metadata_xml")?,
            signing_key: fields.nested("signing_key", SigningKey::expand)?,
            entity_id: fields.string("entity_id")?,
            tenant_domain: fields.string("tenant_domain")?,
            domain_aliases: fields.string_set("domain_aliases")?,
            icon_url: fields.string("icon_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("signing_cert", &self.signing_cert)
            .put("sign_in_endpoint", &self.sign_in_endpoint)
            .put("sign_out_endpoint", &self.sign_out_endpoint)
            .put("disable_sign_out", &self.disable_sign_out)
            .put("sign_saml_request", &self.sign_saml_request)
            .put("signature_algorithm", &self.signature_algorithm)
            .put("digest_algorithm", &self.digest_algorithm)
            .put("protocol_binding", &self.protocol_binding)
            .put("user_id_attribute", &self.user_id_attribute)
            .put("debug", &self.debug)
            .put_nested("idp_initiated", &self.idp_initiated, IdpInitiated::flatten)
            .put("fields_map", &self.fields_map)
            .put("metadata_url", &self.metadata_url)
            .put_write_only("metadata_xml")
            .put_write_only("signing_key")
            .put("entity_id", &self.entity_id)
            .put("tenant_domain", &self.tenant_domain)
            .put_set_patch("domain_aliases", &self.domain_aliases)
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OidcOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    /// `front_channel` or `back_channel`
    #[serde(rename = "type", default, skip_serializing_if = "Patch::is_absent")]
    pub channel: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub issuer: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub jwks_uri: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub discovery_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub token_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub userinfo_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub authorization_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub scope: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub tenant_domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain_aliases: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
}

impl Variant<ConnectionOptions> for OidcOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            channel: fields.string("type")?,
            issuer: fields.string("issuer")?,
            jwks_uri: fields.string("jwks_uri")?,
            discovery_url: fields.string("discovery_url")?,
            token_endpoint: fields.string("token_endpoint")?,
            userinfo_endpoint: fields.string("userinfo_endpoint")?,
            authorization_endpoint: fields.string("authorization_endpoint")?,
            scope: expand_scope_string(fields)?,
            tenant_domain: fields.string("tenant_domain")?,
            domain_aliases: fields.string_set("domain_aliases")?,
            icon_url: fields.string("icon_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put("type", &self.channel)
            .put("issuer", &self.issuer)
            .put("jwks_uri", &self.jwks_uri)
            .put("discovery_url", &self.discovery_url)
            .put("token_endpoint", &self.token_endpoint)
            .put("userinfo_endpoint", &self.userinfo_endpoint)
            .put("authorization_endpoint", &self.authorization_endpoint)
            .put_set(SCOPES_FIELD, parse_scope_string(&self.scope))
            .put("tenant_domain", &self.tenant_domain)
            .put_set_patch("domain_aliases", &self.domain_aliases)
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OktaOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub client_secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub issuer: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub jwks_uri: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub token_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub userinfo_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub authorization_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub scope: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain_aliases: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
}

impl Variant<ConnectionOptions> for OktaOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            client_id: fields.string("client_id")?,
            client_secret: fields.string("client_secret")?,
            domain: fields.string("domain")?,
            issuer: fields.string("issuer")?,
            jwks_uri: fields.string("jwks_uri")?,
            token_endpoint: fields.string("token_endpoint")?,
            userinfo_endpoint: fields.string("userinfo_endpoint")?,
            authorization_endpoint: fields.string("authorization_endpoint")?,
            scope: expand_scope_string(fields)?,
            domain_aliases: fields.string_set("domain_aliases")?,
            icon_url: fields.string("icon_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("client_id", &self.client_id)
            .put_write_only("client_secret")
            .put("domain", &self.domain)
            .put("issuer", &self.issuer)
            .put("jwks_uri", &self.jwks_uri)
            .put("token_endpoint", &self.token_endpoint)
            .put("userinfo_endpoint", &self.userinfo_endpoint)
            .put("authorization_endpoint", &self.authorization_endpoint)
            .put_set(SCOPES_FIELD, parse_scope_string(&self.scope))
            .put_set_patch("domain_aliases", &self.domain_aliases)
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .finish()
    }
}

/// On-premises Active Directory / LDAP via the connector agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub tenant_domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain_aliases: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub ips: Patch<BTreeSet<String>>,
    #[serde(rename = "certAuth", default, skip_serializing_if = "Patch::is_absent")]
    pub use_cert_auth: Patch<bool>,
    #[serde(rename = "kerberos", default, skip_serializing_if = "Patch::is_absent")]
    pub use_kerberos: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub disable_cache: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub brute_force_protection: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
}

impl Variant<ConnectionOptions> for AdOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            tenant_domain: fields.string("tenant_domain")?,
            domain_aliases: fields.string_set("domain_aliases")?,
            ips: fields.string_set("ips")?,
            use_cert_auth: fields.bool("use_cert_auth")?,
            use_kerberos: fields.bool("use_kerberos")?,
            disable_cache: fields.bool("disable_cache")?,
            brute_force_protection: fields.bool("brute_force_protection")?,
            icon_url: fields.string("icon_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("tenant_domain", &self.tenant_domain)
            .put_set_patch("domain_aliases", &self.domain_aliases)
            .put_set_patch("ips", &self.ips)
            .put("use_cert_auth", &self.use_cert_auth)
            .put("use_kerberos", &self.use_kerberos)
            .put("disable_cache", &self.disable_cache)
            .put("brute_force_protection", &self.brute_force_protection)
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingFederateOptions {
    #[serde(
        rename = "pingFederateBaseUrl",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub ping_federate_base_url: Patch<String>,
    #[serde(
        rename = "signingCert",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub signing_cert: Patch<String>,
    #[serde(
        rename = "signSAMLRequest",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub sign_saml_request: Patch<bool>,
    #[serde(
        rename = "signatureAlgorithm",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub signature_algorithm: Patch<String>,
    #[serde(
        rename = "digestAlgorithm",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub digest_algorithm: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub tenant_domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub domain_aliases: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub icon_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
}

impl Variant<ConnectionOptions> for PingFederateOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            ping_federate_base_url: fields.string("ping_federate_base_url")?,
            signing_cert: fields.string("signing_cert")?,
            sign_saml_request: fields.bool("sign_saml_request")?,
            signature_algorithm: fields.string("signature_algorithm")?,
            digest_algorithm: fields.string("digest_algorithm")?,
            tenant_domain: fields.string("tenant_domain")?,
            domain_aliases: fields.string_set("domain_aliases")?,
            icon_url: fields.string("icon_url")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("ping_federate_base_url", &self.ping_federate_base_url)
            .put("signing_cert", &self.signing_cert)
            .put("sign_saml_request", &self.sign_saml_request)
            .put("signature_algorithm", &self.signature_algorithm)
            .put("digest_algorithm", &self.digest_algorithm)
            .put("tenant_domain", &self.tenant_domain)
            .put_set_patch("domain_aliases", &self.domain_aliases)
            .put("icon_url", &self.icon_url)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .finish()
    }
}
