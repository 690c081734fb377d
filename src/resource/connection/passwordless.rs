//! Passwordless strategies: `sms` and `email`

use super::ConnectionOptions;
use crate::error::Result;
use crate::resource::registry::Variant;
use crate::state::{Fields, Flattener, Patch, Tree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One-time code settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totp {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub time_step: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub length: Patch<i64>,
}

impl Totp {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            time_step: fields.int("time_step")?,
            length: fields.int("length")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("time_step", &self.time_step)
            .put("length", &self.length)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmsOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub from: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub syntax: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub template: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub totp: Patch<Totp>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub messaging_service_sid: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub twilio_sid: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub twilio_token: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub provider: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub gateway_url: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub disable_signup: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub brute_force_protection: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub forward_request_info: Patch<bool>,
}

impl Variant<ConnectionOptions> for SmsOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            name: fields.string("name")?,
            from: fields.string("from")?,
            syntax: fields.string("syntax")?,
            template: fields.string("template")?,
            totp: fields.nested("totp", Totp::expand)?,
            messaging_service_sid: fields.string("messaging_service_sid")?,
            twilio_sid: fields.string("twilio_sid")?,
            twilio_token: fields.string("twilio_token")?,
            provider: fields.string("provider")?,
            gateway_url: fields.string("gateway_url")?,
            disable_signup: fields.bool("disable_signup")?,
            brute_force_protection: fields.bool("brute_force_protection")?,
            forward_request_info: fields.bool("forward_request_info")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("name", &self.name)
            .put("from", &self.from)
            .put("syntax", &self.syntax)
            .put("template", &self.template)
            .put_nested("totp", &self.totp, Totp::flatten)
            .put("messaging_service_sid", &self.messaging_service_sid)
            .put("twilio_sid", &self.twilio_sid)
            .put_write_only("twilio_token")
            .put("provider", &self.provider)
            .put("gateway_url", &self.gateway_url)
            .put("disable_signup", &self.disable_signup)
            .put("brute_force_protection", &self.brute_force_protection)
            .put("forward_request_info", &self.forward_request_info)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub from: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub syntax: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub subject: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub template: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub totp: Patch<Totp>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub disable_signup: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub brute_force_protection: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub auth_params: Patch<BTreeMap<String, String>>,
}

impl Variant<ConnectionOptions> for EmailOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            name: fields.string("name")?,
            from: fields.string("from")?,
            syntax: fields.string("syntax")?,
            subject: fields.string("subject")?,
            template: fields.string("template")?,
            totp: fields.nested("totp", Totp::expand)?,
            disable_signup: fields.bool("disable_signup")?,
            brute_force_protection: fields.bool("brute_force_protection")?,
            auth_params: fields.string_map("auth_params")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("name", &self.name)
            .put("from", &self.from)
            .put("syntax", &self.syntax)
            .put("subject", &self.subject)
            .put("template", &self.template)
            .put_nested("totp", &self.totp, Totp::flatten)
            .put("disable_signup", &self.disable_signup)
            .put("brute_force_protection", &self.brute_force_protection)
            .put("auth_params", &self.auth_params)
            .finish()
    }
}
