//! Tag config derived from where a file lives.
//!
//! `src/auth/login/Form.tsx` yields `{ namespace: 'auth', path: 'login' }`:
//! the directory below a root dir names the namespace and deeper directories
//! form the dotted path. Route groups `(group)` and dynamic segments `[id]`
//! never show up in the result.

use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Leading directories stripped before deriving anything. First match wins.
    pub root_dirs: Vec<String>,
    /// Directory names dropped wherever they appear.
    pub ignore_dirs: Vec<String>,
    pub default_namespace: String,
    /// Leave `namespace` out when it equals the default.
    pub clear_on_default_namespace: bool,
}

/// Compute the config a tag in `relative_file_path` should carry.
///
/// Keys other than `namespace` and `path` are kept from `existing`. Returns
/// `None` when the result equals `existing`.
pub fn generate_config(
    relative_file_path: &str,
    existing: Option<&Map<String, Value>>,
    options: &GeneratorOptions,
) -> Option<Map<String, Value>> {
    let segments = directory_segments(relative_file_path, options);

    let (namespace, path) = match segments.split_first() {
        Some((first, rest)) => (first.to_string(), rest.join(".")),
        None => (options.default_namespace.clone(), String::new()),
    };

    let mut config = existing.cloned().unwrap_or_default();

    if options.clear_on_default_namespace && namespace == options.default_namespace {
        config.remove("namespace");
    } else {
        config.insert("namespace".to_string(), Value::String(namespace));
    }

    if path.is_empty() {
        config.remove("path");
    } else {
        config.insert("path".to_string(), Value::String(path));
    }

    let unchanged = match existing {
        Some(existing) => *existing == config,
        None => config.is_empty(),
    };
    if unchanged { None } else { Some(config) }
}

fn directory_segments<'a>(relative_file_path: &'a str, options: &GeneratorOptions) -> Vec<&'a str> {
    let mut segments: Vec<&str> = relative_file_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    // file name
    segments.pop();

    for root in &options.root_dirs {
        let root_segments: Vec<&str> = root
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if !root_segments.is_empty() && segments.starts_with(&root_segments) {
            segments.drain(..root_segments.len());
            break;
        }
    }

    segments
        .into_iter()
        .filter(|segment| !options.ignore_dirs.iter().any(|dir| dir == segment))
        .filter(|segment| !is_route_segment(segment))
        .collect()
}

fn is_route_segment(segment: &str) -> bool {
    (segment.starts_with('(') && segment.ends_with(')'))
        || (segment.starts_with('[') && segment.ends_with(']'))
}
