//! Resource lifecycle controller
//!
//! Drives create/read/update/delete for one [`ResourceKind`]. Every step is
//! sequential and shares one [`Deadline`]. A failure part-way through a
//! multi-call operation is reported in [`SyncOutcome`] together with
//! whatever was already committed remotely.

use super::kind::{check_immutable, is_empty_payload, RelationshipSync, ResourceKind};
use crate::error::{Result, SyncError};
use crate::mgmt::{ApiError, Deadline, ManagementClient};
use crate::state::{tree_to_json, Fields, Tree};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tracing::Instrument;
use uuid::Uuid;

/// Result of a Read
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// The remote resource, flattened into the declared shape
    Found(Tree),
    /// The resource no longer exists; the host should drop it from state
    Gone,
}

impl ReadOutcome {
    pub fn to_json(&self) -> Value {
        match self {
            ReadOutcome::Found(tree) => json!({ "found": true, "state": tree_to_json(tree) }),
            ReadOutcome::Gone => json!({ "found": false }),
        }
    }
}

/// Two-phase result of a Create or Update.
///
/// `identity` is set as soon as the service assigned one, even when a later
/// step failed. `applied` lists the declared keys whose remote mutation
/// succeeded.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub identity: Option<String>,
    pub applied: BTreeSet<String>,
    /// Flattened read-back, present only when the final Read succeeded
    pub state: Option<Tree>,
    pub error: Option<SyncError>,
}

impl SyncOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// The declared tree the host should record as committed: `previous`
    /// with every applied key taken from `desired`.
    pub fn committed_tree(&self, previous: Option<&Tree>, desired: &Tree) -> Tree {
        let mut tree = previous.cloned().unwrap_or_default();
        for key in &self.applied {
            match desired.get(key) {
                Some(value) => {
                    tree.insert(key.clone(), value.clone());
                }
                None => {
                    tree.remove(key);
                }
            }
        }
        tree
    }

    pub fn to_json(&self) -> Value {
        json!({
            "identity": self.identity,
            "applied": self.applied,
            "state": self.state.as_ref().map(tree_to_json),
            "error": self.error.as_ref().map(ToString::to_string),
            "complete": self.is_complete(),
        })
    }

    fn fail(mut self, error: SyncError) -> Self {
        tracing::error!("{}", error);
        self.error = Some(error);
        self
    }
}

/// Lifecycle operations for one resource kind
pub struct Lifecycle<'c, K: ResourceKind + ?Sized> {
    client: &'c ManagementClient,
    kind: &'c K,
}

impl<'c, K: ResourceKind + ?Sized> Lifecycle<'c, K> {
    pub fn new(client: &'c ManagementClient, kind: &'c K) -> Self {
        Self { client, kind }
    }

    fn span(&self, op: &'static str) -> tracing::Span {
        tracing::info_span!(
            "lifecycle",
            kind = self.kind.name(),
            op,
            op_id = %Uuid::new_v4()
        )
    }

    /// Create from `desired`, then apply relationships and read back
    pub async fn create(&self, desired: &Tree, deadline: Deadline) -> SyncOutcome {
        self.create_inner(desired, deadline)
            .instrument(self.span("create"))
            .await
    }

    async fn create_inner(&self, desired: &Tree, deadline: Deadline) -> SyncOutcome {
        let outcome = SyncOutcome::default();
        let fields = Fields::new(None, desired);

        let (payload, relationships) = match prepare(self.kind, &fields) {
            Ok(prepared) => prepared,
            Err(err) => return outcome.fail(err),
        };

        tracing::info!("Creating {}", self.kind.name());
        let created = match self
            .client
            .post::<Value>(self.kind.collection(), &payload, deadline)
            .await
        {
            Ok(created) => created.unwrap_or(Value::Null),
            Err(err) => return outcome.fail(err.into()),
        };
        let id = match self.kind.identity(&created) {
            Ok(id) => id,
            Err(err) => return outcome.fail(err),
        };
        tracing::info!("Created {} {}", self.kind.name(), id);

        self.finish(outcome, id, &fields, relationships, deadline).await
    }

    /// Fetch the remote resource and flatten it against `local`
    pub async fn read(&self, id: &str, local: &Tree, deadline: Deadline) -> Result<ReadOutcome> {
        self.read_inner(id, local, deadline)
            .instrument(self.span("read"))
            .await
    }

    async fn read_inner(&self, id: &str, local: &Tree, deadline: Deadline) -> Result<ReadOutcome> {
        match self.client.get::<Value>(&self.kind.path(id), deadline).await {
            Ok(remote) => Ok(ReadOutcome::Found(self.kind.flatten(remote, local)?)),
            Err(err) if err.is_not_found() => {
                tracing::info!("{} {} is gone", self.kind.name(), id);
                Ok(ReadOutcome::Gone)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Send the fields that changed between `previous` and `desired`
    pub async fn update(
        &self,
        id: &str,
        previous: &Tree,
        desired: &Tree,
        deadline: Deadline,
    ) -> SyncOutcome {
        self.update_inner(id, previous, desired, deadline)
            .instrument(self.span("update"))
            .await
    }

    async fn update_inner(
        &self,
        id: &str,
        previous: &Tree,
        desired: &Tree,
        deadline: Deadline,
    ) -> SyncOutcome {
        let outcome = SyncOutcome {
            identity: Some(id.to_string()),
            ..SyncOutcome::default()
        };
        let fields = Fields::new(Some(previous), desired);

        let (payload, relationships) = match prepare(self.kind, &fields) {
            Ok(prepared) => prepared,
            Err(err) => return outcome.fail(err),
        };

        match is_empty_payload(&payload) {
            Ok(true) => tracing::debug!("No field changes for {} {}", self.kind.name(), id),
            Ok(false) => {
                tracing::info!("Updating {} {}", self.kind.name(), id);
                if let Err(err) = self
                    .client
                    .patch::<Value>(&self.kind.path(id), &payload, deadline)
                    .await
                {
                    return outcome.fail(err.into());
                }
            }
            Err(err) => return outcome.fail(err),
        }

        self.finish(outcome, id.to_string(), &fields, relationships, deadline)
            .await
    }

    /// Delete the remote resource; a resource that is already gone counts
    pub async fn delete(&self, id: &str, deadline: Deadline) -> Result<()> {
        self.delete_inner(id, deadline)
            .instrument(self.span("delete"))
            .await
    }

    async fn delete_inner(&self, id: &str, deadline: Deadline) -> Result<()> {
        match self.client.delete(&self.kind.path(id), None, deadline).await {
            Ok(()) => {
                tracing::info!("Deleted {} {}", self.kind.name(), id);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                tracing::info!("{} {} was already deleted", self.kind.name(), id);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// After the primary write: record applied keys, run relationship
    /// calls and read back
    async fn finish(
        &self,
        mut outcome: SyncOutcome,
        id: String,
        fields: &Fields<'_>,
        relationships: Vec<RelationshipSync>,
        deadline: Deadline,
    ) -> SyncOutcome {
        let linked = self.kind.relationship_fields();
        outcome.applied.extend(
            fields
                .changed_keys()
                .into_iter()
                .filter(|key| !linked.contains(&key.as_str())),
        );
        outcome.identity = Some(id.clone());

        let parent = self.kind.path(&id);
        for sync in &relationships {
            if let Err(err) = self.apply_relationship(&parent, sync, deadline).await {
                return outcome.fail(err);
            }
            outcome.applied.insert(sync.field.to_string());
        }
        // Relationship keys with no net change count as applied too
        outcome
            .applied
            .extend(fields.changed_keys().into_iter().filter(|key| linked.contains(&key.as_str())));

        match self.read_inner(&id, fields.desired(), deadline).await {
            Ok(ReadOutcome::Found(state)) => {
                outcome.state = Some(state);
                outcome
            }
            Ok(ReadOutcome::Gone) => outcome.fail(SyncError::Api(ApiError::NotFound {
                message: format!("{} {} vanished after write", self.kind.name(), id),
            })),
            Err(err) => outcome.fail(err),
        }
    }

    /// Removals first; a removal the service reports as not found is done
    async fn apply_relationship(
        &self,
        parent: &str,
        sync: &RelationshipSync,
        deadline: Deadline,
    ) -> Result<()> {
        let path = sync.path(parent);

        if let Some(body) = &sync.removals {
            tracing::info!("Removing {} from {}", sync.field, parent);
            match self.client.delete(&path, Some(body), deadline).await {
                Ok(()) => {}
                Err(err) if err.is_not_found() => {
                    tracing::debug!("{} already absent on {}", sync.field, parent);
                }
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(body) = &sync.additions {
            tracing::info!("Adding {} to {}", sync.field, parent);
            self.client.post::<Value>(&path, body, deadline).await?;
        }

        Ok(())
    }
}

/// Everything computable locally: immutability check, payload and
/// relationship calls. Any error here means nothing was sent.
fn prepare<K: ResourceKind + ?Sized>(
    kind: &K,
    fields: &Fields<'_>,
) -> Result<(Value, Vec<RelationshipSync>)> {
    check_immutable(fields, kind.immutable_fields())?;
    let payload = kind.payload(fields)?;
    let relationships = kind.relationships(fields)?;
    Ok((payload, relationships))
}

/// The calls an update (or a create, without `previous`) would make,
/// computed without contacting the API
pub fn plan<K: ResourceKind + ?Sized>(
    kind: &K,
    previous: Option<&Tree>,
    desired: &Tree,
) -> Result<Value> {
    let fields = Fields::new(previous, desired);
    let (payload, relationships) = prepare(kind, &fields)?;
    let relationships: Vec<Value> = relationships
        .iter()
        .map(|sync| {
            json!({
                "field": sync.field,
                "additions": sync.additions,
                "removals": sync.removals,
            })
        })
        .collect();

    Ok(json!({
        "kind": kind.name(),
        "changed": fields.changed_keys(),
        "payload": payload,
        "relationships": relationships,
    }))
}
