//! Tag scanner.
//!
//! Finds calls to the configured tag function in raw source text without
//! parsing the host language. A candidate starts wherever `tag({` (optionally
//! preceded by `name =`) appears; its object arguments are delimited by
//! counting braces outside of string literals and comments, then parsed as
//! JSON5.
//!
//! Text that merely looks like a tag call is common in real sources (docs,
//! string literals, generated code), so anything that does not form a complete
//! call is skipped silently and the search resumes one character later.
//! Calls whose arguments are not valid JSON5 are still returned, flagged with a
//! [`TagValidity`] so callers can report them.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::json5::parse_object;


/// Which tag argument carries the translations.
///
/// Projects write either `tag(translations, config)` or
/// `tag(config, translations)`; the other argument holds the config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ArgPosition {
    #[default]
    First,
    Second,
}

impl TryFrom<u8> for ArgPosition {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ArgPosition::First),
            2 => Ok(ArgPosition::Second),
            other => Err(format!(
                "translation argument position must be 1 or 2, got {}",
                other
            )),
        }
    }
}

impl From<ArgPosition> for u8 {
    fn from(position: ArgPosition) -> Self {
        match position {
            ArgPosition::First => 1,
            ArgPosition::Second => 2,
        }
    }
}

/// Classification of a recognized tag call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagValidity {
    Ok,
    InvalidParam1,
    InvalidParam2,
    TranslationsNotFound,
}

impl fmt::Display for TagValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValidity::Ok => write!(f, "ok"),
            TagValidity::InvalidParam1 => write!(f, "invalid-param-1"),
            TagValidity::InvalidParam2 => write!(f, "invalid-param-2"),
            TagValidity::TranslationsNotFound => write!(f, "translations-not-found"),
        }
    }
}

/// Verbatim text around the arguments of a call, kept so a rewrite only
/// touches the argument that actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CallLayout {
    /// From the start of the match up to the first `{`: `name = lang(`.
    head: String,
    /// Between the two arguments, usually `, `.
    separator: Option<String>,
    /// After the last argument up to and including `)`.
    tail: String,
}

/// One recognized tag call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTag {
    /// Exact source text of the call, from `index` through the closing `)`.
    pub full_match: String,
    /// Identifier the call result is assigned to, for `name = tag(...)`.
    pub variable_name: Option<String>,
    pub parameter1_text: String,
    pub parameter2_text: Option<String>,
    /// The argument holding translations; empty unless `validity` is `Ok`.
    pub parameter_translations: Map<String, Value>,
    /// The argument holding namespace/path and extension fields.
    pub parameter_config: Option<Map<String, Value>>,
    /// Byte offset of the match start.
    pub index: usize,
    /// 1-based line of the match start.
    pub line: usize,
    /// 1-based column (in characters) of the match start.
    pub column: usize,
    pub validity: TagValidity,
    layout: CallLayout,
}

impl ProcessedTag {
    pub fn is_valid(&self) -> bool {
        self.validity == TagValidity::Ok
    }

    /// Namespace from the config argument, if set to a non-empty string.
    pub fn namespace(&self) -> Option<&str> {
        self.config_str("namespace")
    }

    /// Dotted path from the config argument, if set to a non-empty string.
    pub fn path(&self) -> Option<&str> {
        self.config_str("path")
    }

    fn config_str(&self, key: &str) -> Option<&str> {
        self.parameter_config
            .as_ref()
            .and_then(|config| config.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Copy of this tag with the config argument replaced.
    ///
    /// Only the parsed config changes; the argument texts still describe the
    /// source as it was scanned.
    pub fn with_config(&self, config: Map<String, Value>) -> ProcessedTag {
        ProcessedTag {
            parameter_config: Some(config),
            ..self.clone()
        }
    }

    /// Rebuild the call text from the given argument texts.
    fn render_call(&self, arg1: &str, arg2: Option<&str>) -> String {
        let mut call = String::with_capacity(self.full_match.len());
        call.push_str(&self.layout.head);
        call.push_str(arg1);
        if let Some(arg2) = arg2 {
            call.push_str(self.layout.separator.as_deref().unwrap_or(", "));
            call.push_str(arg2);
        }
        call.push_str(&self.layout.tail);
        call
    }
}

/// A requested rewrite of one tag.
///
/// `None` keeps the tag's original argument text, comments and formatting
/// included.
#[derive(Debug, Clone)]
pub struct TagReplacement<'a> {
    pub tag: &'a ProcessedTag,
    pub translations_text: Option<String>,
    pub config_text: Option<String>,
}

impl<'a> TagReplacement<'a> {
    pub fn config(tag: &'a ProcessedTag, config_text: String) -> Self {
        Self {
            tag,
            translations_text: None,
            config_text: Some(config_text),
        }
    }

    pub fn translations(tag: &'a ProcessedTag, translations_text: String) -> Self {
        Self {
            tag,
            translations_text: Some(translations_text),
            config_text: None,
        }
    }
}

/// Errors from [`TagScanner::replace_tags`].
///
/// These are caller mistakes, never data problems: the replacement text was
/// produced by the program itself or the source changed under it.
#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("replacement for argument {param} of tag at line {line} is not valid JSON5: {message}")]
    InvalidReplacement {
        line: usize,
        param: u8,
        message: String,
    },
    #[error("tag at byte {index} no longer matches the source text")]
    StaleSource { index: usize },
    #[error("tag at byte {index} overlaps a previous replacement")]
    Overlap { index: usize },
}

/// Scanner for one tag function name.
#[derive(Debug, Clone)]
pub struct TagScanner {
    tag_name: String,
    position: ArgPosition,
    pattern: Regex,
}

impl TagScanner {
    pub fn new(tag_name: &str, position: ArgPosition) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?:([A-Za-z_$][\w$]*)\s*=\s*)?({})\(\s*\{{",
            regex::escape(tag_name)
        ))?;
        Ok(Self {
            tag_name: tag_name.to_string(),
            position,
            pattern,
        })
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Find every tag call in `source`, in source order.
    pub fn extract_tags(&self, source: &str) -> Vec<ProcessedTag> {
        let line_index = build_line_index(source);
        let mut tags = Vec::new();
        let mut cursor = 0;

        while cursor < source.len() {
            let Some(caps) = self.pattern.captures_at(source, cursor) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let start = whole.start();
            let tag_start = caps.get(2).map_or(start, |m| m.start());

            if continues_identifier(source, tag_start) {
                cursor = next_char_boundary(source, start);
                continue;
            }

            match self.match_call(source, start, whole.end() - 1) {
                Some(call) => {
                    let end = call.end;
                    let variable_name = caps.get(1).map(|m| m.as_str().to_string());
                    tags.push(self.process(source, &line_index, start, variable_name, call));
                    cursor = end;
                }
                None => {
                    debug!(
                        "Skipping malformed {} call at byte {}",
                        self.tag_name, start
                    );
                    cursor = next_char_boundary(source, start);
                }
            }
        }

        tags
    }

    /// Delimit the arguments of a candidate whose first `{` is at `open`.
    fn match_call(&self, source: &str, start: usize, open: usize) -> Option<RawCall> {
        let bytes = source.as_bytes();
        let arg1_end = find_object_end(bytes, open)?;
        let arg1 = open..arg1_end;

        let mut i = skip_whitespace(bytes, arg1_end);
        let mut arg2 = None;
        if bytes.get(i) == Some(&b',') {
            i = skip_whitespace(bytes, i + 1);
            if bytes.get(i) != Some(&b'{') {
                return None;
            }
            let arg2_end = find_object_end(bytes, i)?;
            arg2 = Some(i..arg2_end);
            i = skip_whitespace(bytes, arg2_end);
            if bytes.get(i) == Some(&b',') {
                i = skip_whitespace(bytes, i + 1);
            }
        }

        if bytes.get(i) != Some(&b')') {
            return None;
        }

        Some(RawCall {
            start,
            arg1,
            arg2,
            end: i + 1,
        })
    }

    fn process(
        &self,
        source: &str,
        line_index: &[usize],
        index: usize,
        variable_name: Option<String>,
        call: RawCall,
    ) -> ProcessedTag {
        let parameter1_text = source[call.arg1.clone()].to_string();
        let parameter2_text = call.arg2.clone().map(|range| source[range].to_string());

        let layout = CallLayout {
            head: source[call.start..call.arg1.start].to_string(),
            separator: call
                .arg2
                .as_ref()
                .map(|arg2| source[call.arg1.end..arg2.start].to_string()),
            tail: source[call.arg2.as_ref().map_or(call.arg1.end, |r| r.end)..call.end]
                .to_string(),
        };

        let (validity, translations, config) =
            self.classify(&parameter1_text, parameter2_text.as_deref());
        let (line, column) = line_column(source, line_index, index);

        ProcessedTag {
            full_match: source[call.start..call.end].to_string(),
            variable_name,
            parameter1_text,
            parameter2_text,
            parameter_translations: translations.unwrap_or_default(),
            parameter_config: config,
            index,
            line,
            column,
            validity,
            layout,
        }
    }

    #[allow(clippy::type_complexity)]
    fn classify(
        &self,
        param1: &str,
        param2: Option<&str>,
    ) -> (
        TagValidity,
        Option<Map<String, Value>>,
        Option<Map<String, Value>>,
    ) {
        let Ok(first) = parse_object(param1) else {
            return (TagValidity::InvalidParam1, None, None);
        };
        let second = match param2.map(parse_object) {
            Some(Ok(map)) => Some(map),
            Some(Err(_)) => return (TagValidity::InvalidParam2, None, None),
            None => None,
        };

        let (translations, config) = match self.position {
            ArgPosition::First => (Some(first), second),
            ArgPosition::Second => (second, Some(first)),
        };

        match translations {
            Some(translations) => (TagValidity::Ok, Some(translations), config),
            None => (TagValidity::TranslationsNotFound, None, config),
        }
    }

    /// Rewrite tag calls in `source`.
    ///
    /// Each replacement swaps only the arguments it supplies; the call's
    /// surrounding text (assignment, whitespace, trailing comma) is kept.
    /// Replacements are applied in source order against the original offsets.
    pub fn replace_tags(
        &self,
        source: &str,
        replacements: &[TagReplacement<'_>],
    ) -> Result<String, ReplaceError> {
        let mut ordered: Vec<&TagReplacement<'_>> = replacements.iter().collect();
        ordered.sort_by_key(|replacement| replacement.tag.index);

        let mut result = source.to_string();
        let mut offset: isize = 0;
        let mut previous_end = 0;

        for replacement in ordered {
            let tag = replacement.tag;
            let original_end = tag.index + tag.full_match.len();
            if source.get(tag.index..original_end) != Some(tag.full_match.as_str()) {
                return Err(ReplaceError::StaleSource { index: tag.index });
            }
            if tag.index < previous_end {
                return Err(ReplaceError::Overlap { index: tag.index });
            }
            previous_end = original_end;

            let new_call = self.render_replacement(replacement)?;
            let start = (tag.index as isize + offset) as usize;
            result.replace_range(start..start + tag.full_match.len(), &new_call);
            offset += new_call.len() as isize - tag.full_match.len() as isize;
        }

        Ok(result)
    }

    fn render_replacement(&self, replacement: &TagReplacement<'_>) -> Result<String, ReplaceError> {
        let tag = replacement.tag;
        let (param1_new, param2_new) = match self.position {
            ArgPosition::First => (&replacement.translations_text, &replacement.config_text),
            ArgPosition::Second => (&replacement.config_text, &replacement.translations_text),
        };

        for (param, text) in [(1u8, param1_new), (2u8, param2_new)] {
            if let Some(text) = text {
                parse_object(text).map_err(|message| ReplaceError::InvalidReplacement {
                    line: tag.line,
                    param,
                    message,
                })?;
            }
        }

        let arg1 = param1_new.as_deref().unwrap_or(&tag.parameter1_text);
        let arg2 = param2_new.as_deref().or(tag.parameter2_text.as_deref());
        Ok(tag.render_call(arg1, arg2))
    }
}

struct RawCall {
    start: usize,
    arg1: std::ops::Range<usize>,
    arg2: Option<std::ops::Range<usize>>,
    end: usize,
}

#[derive(Clone, Copy)]
enum ScanState {
    Code,
    Quoted(u8),
    LineComment,
    BlockComment,
}

/// Return the offset just past the `}` that closes the `{` at `open`.
///
/// Braces inside string literals (single, double and backtick quoted) and
/// comments are ignored. `None` when the text ends first.
fn find_object_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut state = ScanState::Code;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        match state {
            ScanState::Code => match b {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                b'"' | b'\'' | b'`' => state = ScanState::Quoted(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    state = ScanState::LineComment;
                    i += 1;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    state = ScanState::BlockComment;
                    i += 1;
                }
                _ => {}
            },
            ScanState::Quoted(quote) => {
                if b == b'\\' {
                    i += 1;
                } else if b == quote {
                    state = ScanState::Code;
                }
            }
            ScanState::LineComment => {
                if b == b'\n' {
                    state = ScanState::Code;
                }
            }
            ScanState::BlockComment => {
                if b == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    state = ScanState::Code;
                    i += 1;
                }
            }
        }
        i += 1;
    }

    None
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// True when the byte before `at` belongs to an identifier, so a match
/// starting there is only the tail of a longer name.
fn continues_identifier(source: &str, at: usize) -> bool {
    source[..at]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn next_char_boundary(source: &str, from: usize) -> usize {
    let mut next = from + 1;
    while next < source.len() && !source.is_char_boundary(next) {
        next += 1;
    }
    next
}

/// Byte offsets at which each line starts. Line 1 starts at 0.
fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// 1-based line and character column of a byte offset.
fn line_column(source: &str, line_index: &[usize], offset: usize) -> (usize, usize) {
    let line = match line_index.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    };
    let line_start = line_index[line - 1];
    let column = source[line_start..offset].chars().count() + 1;
    (line, column)
}
