//! Database (`auth0`) strategy options

use super::ConnectionOptions;
use crate::error::Result;
use crate::resource::registry::Variant;
use crate::state::{Fields, Flattener, Patch, Tree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordHistory {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub enable: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub size: Patch<i64>,
}

impl PasswordHistory {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            enable: fields.bool("enable")?,
            size: fields.int("size")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("enable", &self.enable)
            .put("size", &self.size)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordDictionary {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub enable: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub dictionary: Patch<BTreeSet<String>>,
}

impl PasswordDictionary {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            enable: fields.bool("enable")?,
            dictionary: fields.string_set("dictionary")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("enable", &self.enable)
            .put_set_patch("dictionary", &self.dictionary)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toggle {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub enable: Patch<bool>,
}

impl Toggle {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            enable: fields.bool("enable")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local).put("enable", &self.enable).finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordComplexity {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub min_length: Patch<i64>,
}

impl PasswordComplexity {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            min_length: fields.int("min_length")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("min_length", &self.min_length)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mfa {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub active: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub return_enroll_settings: Patch<bool>,
}

impl Mfa {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            active: fields.bool("active")?,
            return_enroll_settings: fields.bool("return_enroll_settings")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("active", &self.active)
            .put("return_enroll_settings", &self.return_enroll_settings)
            .finish()
    }
}

/// `validation.username` length bounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub username: Patch<UsernameLength>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsernameLength {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub min: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub max: Patch<i64>,
}

impl Validation {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            username: fields.nested("username", |username| {
                Ok(UsernameLength {
                    min: username.int("min")?,
                    max: username.int("max")?,
                })
            })?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put_nested("username", &self.username, |length, local| {
                Flattener::new(local)
                    .put("min", &length.min)
                    .put("max", &length.max)
                    .finish()
            })
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseOptions {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub validation: Patch<Validation>,
    #[serde(
        rename = "passwordPolicy",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub password_policy: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub password_history: Patch<PasswordHistory>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub password_no_personal_info: Patch<Toggle>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub password_dictionary: Patch<PasswordDictionary>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub password_complexity_options: Patch<PasswordComplexity>,
    #[serde(
        rename = "enabledDatabaseCustomization",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub enabled_database_customization: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub brute_force_protection: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub import_mode: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub disable_signup: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub requires_username: Patch<bool>,
    #[serde(
        rename = "customScripts",
        default,
        skip_serializing_if = "Patch::is_absent"
    )]
    pub custom_scripts: Patch<BTreeMap<String, String>>,
    /// Secrets available to custom scripts; never returned on read
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub configuration: Patch<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub mfa: Patch<Mfa>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub non_persistent_attrs: Patch<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub set_user_root_attributes: Patch<String>,
}

impl Variant<ConnectionOptions> for DatabaseOptions {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            validation: fields.nested("validation", Validation::expand)?,
            password_policy: fields.string("password_policy")?,
            password_history: fields.nested("password_history", PasswordHistory::expand)?,
            password_no_personal_info: fields.nested("password_no_personal_info", Toggle::expand)?,
            password_dictionary: fields.nested("password_dictionary", PasswordDictionary::expand)?,
            password_complexity_options: fields
                .nested("password_complexity_options", PasswordComplexity::expand)?,
            enabled_database_customization: fields.bool("enabled_database_customization")?,
            brute_force_protection: fields.bool("brute_force_protection")?,
            import_mode: fields.bool("import_mode")?,
            disable_signup: fields.bool("disable_signup")?,
            requires_username: fields.bool("requires_username")?,
            custom_scripts: fields.string_map("custom_scripts")?,
            configuration: fields.string_map("configuration")?,
            mfa: fields.nested("mfa", Mfa::expand)?,
            non_persistent_attrs: fields.string_set("non_persistent_attrs")?,
            set_user_root_attributes: fields.string("set_user_root_attributes")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put_nested("validation", &self.validation, Validation::flatten)
            .put("password_policy", &self.password_policy)
            .put_nested("password_history", &self.password_history, PasswordHistory::flatten)
            .put_nested(
                "password_no_personal_info",
                &self.password_no_personal_info,
                Toggle::flatten,
            )
            .put_nested(
                "password_dictionary",
                &self.password_dictionary,
                PasswordDictionary::flatten,
            )
            .put_nested(
                "password_complexity_options",
                &self.password_complexity_options,
                PasswordComplexity::flatten,
            )
            .put("enabled_database_customization", &self.enabled_database_customization)
            .put("brute_force_protection", &self.brute_force_protection)
            .put("import_mode", &self.import_mode)
            .put("disable_signup", &self.disable_signup)
            .put("requires_username", &self.requires_username)
            .put("custom_scripts", &self.custom_scripts)
            .put_write_only("configuration")
            .put_nested("mfa", &self.mfa, Mfa::flatten)
            .put_set_patch("non_persistent_attrs", &self.non_persistent_attrs)
            .put("set_user_root_attributes", &self.set_user_root_attributes)
            .finish()
    }
}
