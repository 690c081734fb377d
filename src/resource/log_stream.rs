//! Log streams: event export sinks keyed by `type`

use super::kind::{check_immutable, is_empty_payload, to_payload, ResourceKind};
use super::registry::{variant_members, Variant, VariantFamily, VariantRegistry};
use crate::error::Result;
use crate::state::{Fields, Flattener, Patch, Tree};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Type-specific `sink` object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogStreamSink {
    Http(HttpSink),
    EventBridge(EventBridgeSink),
    EventGrid(EventGridSink),
    Datadog(DatadogSink),
    Splunk(SplunkSink),
    Sumo(SumoSink),
    Mixpanel(MixpanelSink),
    Segment(SegmentSink),
}

impl VariantFamily for LogStreamSink {
    const NAME: &'static str = "log stream type";
}

variant_members!(LogStreamSink {
    Http(HttpSink),
    EventBridge(EventBridgeSink),
    EventGrid(EventGridSink),
    Datadog(DatadogSink),
    Splunk(SplunkSink),
    Sumo(SumoSink),
    Mixpanel(MixpanelSink),
    Segment(SegmentSink),
});

static REGISTRY: OnceLock<VariantRegistry<LogStreamSink>> = OnceLock::new();

pub fn registry() -> &'static VariantRegistry<LogStreamSink> {
    REGISTRY.get_or_init(|| {
        VariantRegistry::new()
            .with::<HttpSink>("http")
            .with::<EventBridgeSink>("eventbridge")
            .with::<EventGridSink>("eventgrid")
            .with::<DatadogSink>("datadog")
            .with::<SplunkSink>("splunk")
            .with::<SumoSink>("sumo")
            .with::<MixpanelSink>("mixpanel")
            .with::<SegmentSink>("segment")
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSink {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub http_endpoint: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub http_content_type: Patch<String>,
    /// `JSONARRAY`, `JSONLINES` or `JSONOBJECT`
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub http_content_format: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub http_authorization: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub http_custom_headers: Patch<Vec<Tree>>,
}

impl Variant<LogStreamSink> for HttpSink {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            http_endpoint: fields.string("http_endpoint")?,
            http_content_type: fields.string("http_content_type")?,
            http_content_format: fields.string("http_content_format")?,
            http_authorization: fields.string("http_authorization")?,
            http_custom_headers: fields.map_list("http_custom_headers")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("http_endpoint", &self.http_endpoint)
            .put("http_content_type", &self.http_content_type)
            .put("http_content_format", &self.http_content_format)
            .put_write_only("http_authorization")
            .put_map_list("http_custom_headers", &self.http_custom_headers)
            .finish()
    }
}

/// Amazon EventBridge. Account and region are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBridgeSink {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub aws_account_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub aws_region: Patch<String>,
    /// Assigned by the service
    #[serde(default, skip_serializing)]
    pub aws_partner_event_source: Patch<String>,
}

impl EventBridgeSink {
    const FIXED: &'static [&'static str] = &["aws_account_id", "aws_region"];
}

impl Variant<LogStreamSink> for EventBridgeSink {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        check_immutable(fields, Self::FIXED)?;
        Ok(Self {
            aws_account_id: fields.string("aws_account_id")?,
            aws_region: fields.string("aws_region")?,
            aws_partner_event_source: Patch::Absent,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("aws_account_id", &self.aws_account_id)
            .put("aws_region", &self.aws_region)
            .put("aws_partner_event_source", &self.aws_partner_event_source)
            .finish()
    }
}

/// Azure Event Grid. Subscription, region and group are fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventGridSink {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub azure_subscription_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub azure_region: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub azure_resource_group: Patch<String>,
    /// Assigned by the service
    #[serde(default, skip_serializing)]
    pub azure_partner_topic: Patch<String>,
}

impl EventGridSink {
    const FIXED: &'static [&'static str] =
        &["azure_subscription_id", "azure_region", "azure_resource_group"];
}

impl Variant<LogStreamSink> for EventGridSink {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        check_immutable(fields, Self::FIXED)?;
        Ok(Self {
            azure_subscription_id: fields.string("azure_subscription_id")?,
            azure_region: fields.string("azure_region")?,
            azure_resource_group: fields.string("azure_resource_group")?,
            azure_partner_topic: Patch::Absent,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("azure_subscription_id", &self.azure_subscription_id)
            .put("azure_region", &self.azure_region)
            .put("azure_resource_group", &self.azure_resource_group)
            .put("azure_partner_topic", &self.azure_partner_topic)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatadogSink {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub datadog_region: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub datadog_api_key: Patch<String>,
}

impl Variant<LogStreamSink> for DatadogSink {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            datadog_region: fields.string("datadog_region")?,
            datadog_api_key: fields.string("datadog_api_key")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("datadog_region", &self.datadog_region)
            .put_write_only("datadog_api_key")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplunkSink {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub splunk_domain: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub splunk_token: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub splunk_port: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub splunk_secure: Patch<bool>,
}

impl Variant<LogStreamSink> for SplunkSink {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            splunk_domain: fields.string("splunk_domain")?,
            splunk_token: fields.string("splunk_token")?,
            splunk_port: fields.string("splunk_port")?,
            splunk_secure: fields.bool("splunk_secure")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("splunk_domain", &self.splunk_domain)
            .put_write_only("splunk_token")
            .put("splunk_port", &self.splunk_port)
            .put("splunk_secure", &self.splunk_secure)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SumoSink {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub sumo_source_address: Patch<String>,
}

impl Variant<LogStreamSink> for SumoSink {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            sumo_source_address: fields.string("sumo_source_address")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("sumo_source_address", &self.sumo_source_address)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixpanelSink {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub mixpanel_region: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub mixpanel_project_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub mixpanel_service_account_username: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub mixpanel_service_account_password: Patch<String>,
}

impl Variant<LogStreamSink> for MixpanelSink {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            mixpanel_region: fields.string("mixpanel_region")?,
            mixpanel_project_id: fields.string("mixpanel_project_id")?,
            mixpanel_service_account_username: fields.string("mixpanel_service_account_username")?,
            mixpanel_service_account_password: fields.string("mixpanel_service_account_password")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put("mixpanel_region", &self.mixpanel_region)
            .put("mixpanel_project_id", &self.mixpanel_project_id)
            .put(
                "mixpanel_service_account_username",
                &self.mixpanel_service_account_username,
            )
            .put_write_only("mixpanel_service_account_password")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSink {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub segment_write_key: Patch<String>,
}

impl Variant<LogStreamSink> for SegmentSink {
    fn expand(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            segment_write_key: fields.string("segment_write_key")?,
        })
    }

    fn flatten(&self, local: &Tree) -> Tree {
        Flattener::new(local)
            .put_write_only("segment_write_key")
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LogStreamPayload {
    #[serde(skip_serializing_if = "Patch::is_absent")]
    name: Patch<String>,
    #[serde(rename = "type", skip_serializing_if = "Patch::is_absent")]
    stream_type: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    status: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    filters: Patch<Vec<Tree>>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    is_priority: Patch<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sink: Option<LogStreamSink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogStreamResponse {
    #[serde(default)]
    name: Patch<String>,
    #[serde(rename = "type")]
    stream_type: String,
    #[serde(default)]
    status: Patch<String>,
    #[serde(default)]
    filters: Patch<Vec<Tree>>,
    #[serde(default)]
    is_priority: Patch<bool>,
    #[serde(default)]
    sink: Value,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogStreamKind;

impl ResourceKind for LogStreamKind {
    fn name(&self) -> &'static str {
        "log stream"
    }

    fn collection(&self) -> &'static str {
        "log-streams"
    }

    fn immutable_fields(&self) -> &'static [&'static str] {
        &["type"]
    }

    fn payload(&self, fields: &Fields<'_>) -> Result<Value> {
        let stream_type = fields.required_string("type")?;
        let handler = registry().resolve(&stream_type)?;
        let sink = (handler.expand)(&fields.block("sink")?)?;

        to_payload(&LogStreamPayload {
            name: fields.string("name")?,
            stream_type: fields.string("type")?,
            status: fields.string("status")?,
            filters: fields.map_list("filters")?,
            is_priority: fields.bool("is_priority")?,
            sink: if is_empty_payload(&sink)? {
                None
            } else {
                Some(sink)
            },
        })
    }

    fn flatten(&self, remote: Value, local: &Tree) -> Result<Tree> {
        let response: LogStreamResponse = serde_json::from_value(remote)?;
        let handler = registry().resolve(&response.stream_type)?;
        let sink = (handler.decode)(response.sink)?;

        let mut out = Flattener::new(local);
        let sink = (handler.flatten)(&sink, out.local_block("sink"))?;
        Ok(out
            .put("name", &response.name)
            .put("type", &Patch::Value(response.stream_type))
            .put("status", &response.status)
            .put_map_list("filters", &response.filters)
            .put("is_priority", &response.is_priority)
            .put_block("sink", sink)
            .finish())
    }
}
