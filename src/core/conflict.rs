//! Conflicts between tags and the hooks that decide what to do about them.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::scanner::ProcessedTag;

/// Which tag wrote a value, and from where.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub tag: Arc<ProcessedTag>,
    pub relative_file_path: Arc<str>,
    pub value: Value,
}

impl Provenance {
    /// `file:line:column` of the owning tag.
    pub fn location(&self) -> String {
        format!(
            "{}:{}:{}",
            self.relative_file_path, self.tag.line, self.tag.column
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Same value type, different value.
    PathOverwrite,
    /// Incompatible types, or a path that runs through a leaf.
    TypeMismatch,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::PathOverwrite => write!(f, "path_overwrite"),
            ConflictKind::TypeMismatch => write!(f, "type_mismatch"),
        }
    }
}

/// Two tags disagreeing about one dotted path of a collection.
///
/// `tag_a` is the value that was kept (seen first), `tag_b` the one that was
/// discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub collection: String,
    pub path: String,
    pub tag_a: Provenance,
    pub tag_b: Provenance,
    pub kind: ConflictKind,
}

/// Answer of a conflict hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    /// Abort the run; nothing gets persisted.
    Stop,
}

/// Hooks consulted while collections are built.
///
/// `on_conflict` runs synchronously for every conflict as soon as it is
/// detected, before the next tag is merged. `on_collect_finish` sees every
/// conflict of the run once all tags have been merged.
pub trait ConflictResolver {
    fn on_conflict(&mut self, conflict: &Conflict) -> HookAction;

    fn on_collect_finish(&mut self, _conflicts: &[Conflict]) -> HookAction {
        HookAction::Continue
    }
}

/// What to do as soon as a conflict shows up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    #[default]
    Continue,
    Stop,
}

/// Resolver driven by the `collect` section of the config.
#[derive(Debug, Clone, Copy)]
pub struct PolicyResolver {
    pub on_conflict: ConflictPolicy,
    pub fail_on_conflicts: bool,
}

impl ConflictResolver for PolicyResolver {
    fn on_conflict(&mut self, conflict: &Conflict) -> HookAction {
        debug!(
            "Conflict [{}] in '{}' at '{}': {} keeps {}, {} discarded {}",
            conflict.kind,
            conflict.collection,
            conflict.path,
            conflict.tag_a.location(),
            conflict.tag_a.value,
            conflict.tag_b.location(),
            conflict.tag_b.value,
        );
        match self.on_conflict {
            ConflictPolicy::Continue => HookAction::Continue,
            ConflictPolicy::Stop => HookAction::Stop,
        }
    }

    fn on_collect_finish(&mut self, conflicts: &[Conflict]) -> HookAction {
        if self.fail_on_conflicts && !conflicts.is_empty() {
            HookAction::Stop
        } else {
            HookAction::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::scanner::{ArgPosition, TagScanner};

    fn conflict(kind: ConflictKind) -> Conflict {
        let tags = TagScanner::new("lang", ArgPosition::First)
            .unwrap()
            .extract_tags("lang({ a: 'x' });\nlang({ a: 'y' });");
        let provenance = |tag: &ProcessedTag, value| Provenance {
            tag: Arc::new(tag.clone()),
            relative_file_path: Arc::from("src/a.ts"),
            value,
        };
        Conflict {
            collection: "common".to_string(),
            path: "a".to_string(),
            tag_a: provenance(&tags[0], json!("x")),
            tag_b: provenance(&tags[1], json!("y")),
            kind,
        }
    }

    #[test]
    fn test_location_and_kind_display() {
        let conflict = conflict(ConflictKind::PathOverwrite);
        assert_eq!(conflict.tag_a.location(), "src/a.ts:1:1");
        assert_eq!(conflict.tag_b.location(), "src/a.ts:2:1");
        assert_eq!(conflict.kind.to_string(), "path_overwrite");
        assert_eq!(ConflictKind::TypeMismatch.to_string(), "type_mismatch");
    }

    #[test]
    fn test_policy_continue() {
        let mut resolver = PolicyResolver {
            on_conflict: ConflictPolicy::Continue,
            fail_on_conflicts: false,
        };
        let conflict = conflict(ConflictKind::PathOverwrite);

        assert_eq!(resolver.on_conflict(&conflict), HookAction::Continue);
        assert_eq!(resolver.on_collect_finish(&[conflict]), HookAction::Continue);
    }

    #[test]
    fn test_policy_stop_on_first_conflict() {
        let mut resolver = PolicyResolver {
            on_conflict: ConflictPolicy::Stop,
            fail_on_conflicts: false,
        };
        assert_eq!(
            resolver.on_conflict(&conflict(ConflictKind::TypeMismatch)),
            HookAction::Stop
        );
    }

    #[test]
    fn test_fail_on_conflicts_only_with_conflicts() {
        let mut resolver = PolicyResolver {
            on_conflict: ConflictPolicy::Continue,
            fail_on_conflicts: true,
        };
        assert_eq!(resolver.on_collect_finish(&[]), HookAction::Continue);
        assert_eq!(
            resolver.on_collect_finish(&[conflict(ConflictKind::PathOverwrite)]),
            HookAction::Stop
        );
    }
}
