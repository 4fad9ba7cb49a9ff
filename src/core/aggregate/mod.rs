//! Aggregation engine.
//!
//! Merges the translations of every valid tag into per-collection trees,
//! visiting files in the given order and tags in source order. The first tag
//! to write a path owns it: later writes that disagree are discarded and
//! reported as [`Conflict`]s through the [`ConflictResolver`] hooks.
//!
//! Arrays in translations are not supported and are skipped without a
//! conflict.

use std::{collections::BTreeMap, sync::Arc};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::{
    collector::Collector,
    conflict::{Conflict, ConflictKind, ConflictResolver, HookAction, Provenance},
    provenance::{KeyPath, ProvenanceTracker, dotted},
    scanner::ProcessedTag,
};


/// Tags found in one source file.
#[derive(Debug, Clone)]
pub struct FileTags {
    pub relative_file_path: String,
    pub tags: Vec<ProcessedTag>,
}

/// Collection name → nested translation tree.
pub type Collections = BTreeMap<String, Map<String, Value>>;

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Namespace for tags whose config does not name one.
    pub default_namespace: String,
    /// Equal values written twice to the same path are not a conflict.
    pub ignore_conflicts_with_matching_values: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            default_namespace: "common".to_string(),
            ignore_conflicts_with_matching_values: true,
        }
    }
}

/// Result of a completed aggregation.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    pub collections: Collections,
    pub conflicts: Vec<Conflict>,
    /// Tags left out because they were not valid.
    pub skipped_tags: usize,
}

#[derive(Debug, Error)]
pub enum CollectError {
    /// A hook asked to stop. Carries every conflict seen up to that point.
    #[error("collection aborted after {} conflict(s)", conflicts.len())]
    Aborted { conflicts: Vec<Conflict> },
    #[error("no recorded writer for '{path}' in collection '{collection}'")]
    MissingProvenance { collection: String, path: String },
}

/// Build collections from scanned tags.
///
/// Runs sequentially: conflict order and first-write-wins both depend on
/// visiting files and tags exactly in the order given.
pub fn group_tags_to_collections<C: Collector>(
    files: &[FileTags],
    collector: &C,
    resolver: &mut dyn ConflictResolver,
    options: &MergeOptions,
) -> Result<CollectOutcome, CollectError> {
    let mut collections = Collections::new();
    let mut tracker = ProvenanceTracker::new();
    let mut sink = ConflictSink {
        resolver,
        conflicts: Vec::new(),
    };
    let mut skipped_tags = 0;

    for file in files {
        let relative_file_path: Arc<str> = Arc::from(file.relative_file_path.as_str());

        for tag in &file.tags {
            if !tag.is_valid() {
                debug!(
                    "Skipping {} tag at {}:{}:{}",
                    tag.validity, file.relative_file_path, tag.line, tag.column
                );
                skipped_tags += 1;
                continue;
            }

            let tag = collector.transform_tag(tag);
            let namespace = tag
                .namespace()
                .unwrap_or(options.default_namespace.as_str());
            let collection = collector.aggregate_collection(namespace);
            let root = collections.entry(collection.clone()).or_default();

            let mut ctx = MergeContext {
                collection: &collection,
                tag: Arc::new(tag),
                file: relative_file_path.clone(),
                tracker: &mut tracker,
                sink: &mut sink,
                ignore_matching: options.ignore_conflicts_with_matching_values,
            };
            merge_tag(root, &mut ctx)?;
        }
    }

    let conflicts = sink.conflicts;
    if sink.resolver.on_collect_finish(&conflicts) == HookAction::Stop {
        return Err(CollectError::Aborted { conflicts });
    }

    Ok(CollectOutcome {
        collections,
        conflicts,
        skipped_tags,
    })
}

struct ConflictSink<'r> {
    resolver: &'r mut dyn ConflictResolver,
    conflicts: Vec<Conflict>,
}

impl ConflictSink<'_> {
    fn report(&mut self, conflict: Conflict) -> Result<(), CollectError> {
        let action = self.resolver.on_conflict(&conflict);
        self.conflicts.push(conflict);
        match action {
            HookAction::Continue => Ok(()),
            HookAction::Stop => Err(CollectError::Aborted {
                conflicts: std::mem::take(&mut self.conflicts),
            }),
        }
    }
}

struct MergeContext<'a, 'r> {
    collection: &'a str,
    tag: Arc<ProcessedTag>,
    file: Arc<str>,
    tracker: &'a mut ProvenanceTracker,
    sink: &'a mut ConflictSink<'r>,
    ignore_matching: bool,
}

impl MergeContext<'_, '_> {
    fn provenance(&self, value: Value) -> Provenance {
        Provenance {
            tag: self.tag.clone(),
            relative_file_path: self.file.clone(),
            value,
        }
    }

    /// Report a conflict between the node already at `path` and `incoming`.
    fn conflict(
        &mut self,
        kind: ConflictKind,
        path: &KeyPath,
        existing: &Value,
        incoming: &Value,
    ) -> Result<(), CollectError> {
        let owner = self
            .tracker
            .owner(self.collection, path, existing)
            .ok_or_else(|| CollectError::MissingProvenance {
                collection: self.collection.to_string(),
                path: dotted(path),
            })?;
        let tag_a = Provenance {
            value: existing.clone(),
            ..owner.clone()
        };
        let tag_b = self.provenance(incoming.clone());

        debug!(
            "{} conflict at '{}' in '{}' ({} vs {})",
            kind,
            dotted(path),
            self.collection,
            tag_a.location(),
            tag_b.location()
        );

        self.sink.report(Conflict {
            collection: self.collection.to_string(),
            path: dotted(path),
            tag_a,
            tag_b,
            kind,
        })
    }
}

/// Place one tag's translations at its path inside `root`.
fn merge_tag(
    root: &mut Map<String, Value>,
    ctx: &mut MergeContext<'_, '_>,
) -> Result<(), CollectError> {
    let tag = ctx.tag.clone();
    let segments = tag
        .path()
        .map(|path| {
            path.split('.')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut node = root;
    let mut walked: Vec<String> = Vec::new();

    for segment in segments {
        walked.push(segment.to_string());

        if !node.contains_key(segment) {
            node.insert(segment.to_string(), Value::Object(Map::new()));
            let provenance = ctx.provenance(Value::Object(Map::new()));
            ctx.tracker
                .record_container(ctx.collection, &walked, provenance);
        }

        match node.get_mut(segment) {
            Some(Value::Object(map)) => node = map,
            Some(leaf) => {
                // Cannot descend through a leaf; the existing value stays and
                // the whole tag is dropped.
                let incoming = Value::Object(tag.parameter_translations.clone());
                return ctx.conflict(ConflictKind::TypeMismatch, &walked, leaf, &incoming);
            }
            None => return Ok(()),
        }
    }

    merge_object(node, &tag.parameter_translations, &walked, ctx)
}

fn merge_object(
    target: &mut Map<String, Value>,
    incoming: &Map<String, Value>,
    prefix: &KeyPath,
    ctx: &mut MergeContext<'_, '_>,
) -> Result<(), CollectError> {
    for (key, value) in incoming {
        if value.is_array() {
            continue;
        }
        let mut path = prefix.to_vec();
        path.push(key.clone());

        match target.get_mut(key) {
            None => match value {
                Value::Object(child) => {
                    let mut created = Map::new();
                    let provenance = ctx.provenance(Value::Object(Map::new()));
                    ctx.tracker
                        .record_container(ctx.collection, &path, provenance);
                    merge_object(&mut created, child, &path, ctx)?;
                    target.insert(key.clone(), Value::Object(created));
                }
                leaf => {
                    target.insert(key.clone(), leaf.clone());
                    let provenance = ctx.provenance(leaf.clone());
                    ctx.tracker.record(ctx.collection, &path, provenance);
                }
            },
            Some(Value::Object(existing)) if value.is_object() => {
                if let Value::Object(child) = value {
                    merge_object(existing, child, &path, ctx)?;
                }
            }
            Some(existing) => {
                if value_kind(existing) != value_kind(value) {
                    ctx.conflict(ConflictKind::TypeMismatch, &path, existing, value)?;
                } else if !same_value(existing, value) || !ctx.ignore_matching {
                    ctx.conflict(ConflictKind::PathOverwrite, &path, existing, value)?;
                }
            }
        }
    }
    Ok(())
}

/// Equality as the source literals mean it: `1` and `1.0` are the same number.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

fn value_kind(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Bool,
        Value::Number(_) => ValueKind::Number,
        Value::String(_) => ValueKind::String,
        Value::Array(_) => ValueKind::Array,
        Value::Object(_) => ValueKind::Object,
    }
}
