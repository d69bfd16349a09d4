//! Model ⇄ API translation for capacity pools.

use super::{RESOURCE_KIND, SERVICE};
use crate::clients::PoolDescription;
use crate::model::{CapacityPool, Tag};
use lifecycle_framework::{
    diff, needs_reconciliation, Addressing, HandlerRequest, RemoteError, TagDiff, TagLayers,
    TagSet,
};

/// The pool name every call needs. Missing names are a caller error.
pub fn pool_name(model: &CapacityPool) -> Result<String, RemoteError> {
    model
        .name
        .clone()
        .ok_or_else(|| RemoteError::new("ValidationException", "Pool name is required"))
}

pub fn pool_arn(addressing: &Addressing, name: &str) -> String {
    addressing.arn(SERVICE, RESOURCE_KIND, name).to_string()
}

/// Folds a remote description into the model, rebuilding the ARN.
pub fn apply_description(
    model: &mut CapacityPool,
    description: &PoolDescription,
    addressing: &Addressing,
) {
    model.arn = Some(pool_arn(addressing, &description.name));
    model.name = Some(description.name.clone());
    model.target_capacity = Some(description.target_capacity);
    model.status = Some(description.status.clone());
}

/// An identity-only model, as List returns them.
pub fn identity_model(name: String, addressing: &Addressing) -> CapacityPool {
    CapacityPool {
        arn: Some(pool_arn(addressing, &name)),
        name: Some(name),
        ..Default::default()
    }
}

pub fn model_tags(model: &CapacityPool) -> TagSet {
    TagSet::from_entries(
        model
            .tags
            .iter()
            .flatten()
            .map(|tag| (tag.key.as_str(), tag.value.as_deref())),
    )
}

/// `None` when the set is empty, so a pool without tags reads back as such.
pub fn tag_list(tags: TagSet) -> Option<Vec<Tag>> {
    if tags.is_empty() {
        return None;
    }
    Some(tags.into_iter().map(|(key, value)| Tag::new(key, value)).collect())
}

/// Everything Create should apply: resource, stack and system layers.
pub fn create_tags(request: &HandlerRequest<CapacityPool>) -> TagSet {
    TagLayers {
        resource: model_tags(&request.desired),
        stack: request.stack_tags.clone(),
        system: request.system_tags.clone(),
    }
    .merged()
}

/// The tag edit Update must issue, or `None` when nothing changed.
///
/// System tags are managed by the provider and never part of the edit.
pub fn update_tag_diff(request: &HandlerRequest<CapacityPool>) -> Option<TagDiff> {
    let previous = TagLayers {
        resource: request.previous.as_ref().map(model_tags).unwrap_or_default(),
        stack: request.previous_stack_tags.clone(),
        system: TagSet::new(),
    }
    .merged()
    .without_system();
    let desired = TagLayers {
        resource: model_tags(&request.desired),
        stack: request.stack_tags.clone(),
        system: TagSet::new(),
    }
    .merged()
    .without_system();

    needs_reconciliation(&previous, &desired).then(|| diff(&previous, &desired))
}
