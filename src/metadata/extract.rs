//! Metadata extraction from script source
//!
//! Finds the first `/** ... */` doc comment (after an optional `#!` line)
//! and decodes the `@runx` payload inside it. The older delimited shape
//!
//! ```text
//! /**
//!  * /// script
//!  * dependencies = ["chalk@5.3.0", "zod@3.22.0"]
//!  * ///
//!  */
//! ```
//!
//! is still accepted and mapped onto the same schema.
//!
//! The object payload is located by brace-depth matching. Braces inside
//! quoted JSON strings are not special-cased, so a value containing a
//! literal `{` or `}` can end the scan early and surface as a parse error.

use crate::error::{RunxError, RunxResult};
use crate::metadata::schema::{Extracted, ScriptMetadata};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Doc-comment tag that introduces the JSON payload
pub const TAG: &str = "@runx";

/// Version used for legacy entries declared without one
const LEGACY_ANY_VERSION: &str = "*";

/// Read a script from disk and extract its metadata
pub async fn extract_file(path: &Path) -> RunxResult<ScriptMetadata> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RunxError::io(format!("reading script {}", path.display()), e))?;
    extract(&source)
}

/// Extract metadata, falling back to defaults when none is declared
pub fn extract(source: &str) -> RunxResult<ScriptMetadata> {
    parse(source).map(Extracted::into_metadata)
}

/// Scan source text for a metadata block
///
/// Missing metadata is `Ok(Extracted::NoMetadata)`; a payload that exists
/// but cannot be decoded is a `MetadataParse` error.
pub fn parse(source: &str) -> RunxResult<Extracted> {
    let Some(block) = doc_comment(source) else {
        debug!("No doc comment found");
        return Ok(Extracted::NoMetadata);
    };

    let lines: Vec<&str> = block.lines().map(strip_comment_prefix).collect();

    if let Some(region) = tagged_region(&lines) {
        return match object_payload(&region)? {
            Some(fragment) => decode(fragment).map(Extracted::Declared),
            None => {
                debug!("{} tag has no payload", TAG);
                Ok(Extracted::NoMetadata)
            }
        };
    }

    if let Some(metadata) = legacy_block(&lines.join("\n")) {
        debug!("Using legacy /// script block");
        return Ok(Extracted::Declared(metadata));
    }

    Ok(Extracted::NoMetadata)
}

/// Contents of the first doc comment, without its delimiters
fn doc_comment(source: &str) -> Option<&str> {
    let body = if source.starts_with("#!") {
        source.split_once('\n').map_or("", |(_, rest)| rest)
    } else {
        source
    };

    let start = body.find("/**")? + 3;
    let len = body[start..].find("*/")?;
    Some(&body[start..start + len])
}

/// Remove leading whitespace, one `*`, and one following space
fn strip_comment_prefix(line: &str) -> &str {
    let line = line.trim_start();
    let line = line.strip_prefix('*').unwrap_or(line);
    line.strip_prefix(' ').unwrap_or(line)
}

/// Byte offset just past the tag, if the line carries it as a whole word
///
/// The tag must open the line or follow whitespace, so addresses such as
/// `team@runx.dev` are not mistaken for it.
fn tag_end(line: &str) -> Option<usize> {
    line.match_indices(TAG).find_map(|(idx, _)| {
        let end = idx + TAG.len();
        let leading = line[..idx].chars().next_back().is_none_or(char::is_whitespace);
        let trailing = line[end..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '-' || c == '_' || c == '.'));
        (leading && trailing).then_some(end)
    })
}

/// Text following the tag, up to the next doc tag or the end of the block
fn tagged_region(lines: &[&str]) -> Option<String> {
    let (idx, end) = lines
        .iter()
        .enumerate()
        .find_map(|(idx, line)| tag_end(line).map(|end| (idx, end)))?;

    let mut region = vec![&lines[idx][end..]];
    region.extend(
        lines[idx + 1..]
            .iter()
            .take_while(|line| !line.trim_start().starts_with('@'))
            .copied(),
    );
    Some(region.join("\n"))
}

/// Slice from the first `{` to its matching `}`
fn object_payload(region: &str) -> RunxResult<Option<&str>> {
    let Some(start) = region.find('{') else {
        return Ok(None);
    };

    let mut depth = 0usize;
    for (offset, c) in region[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(&region[start..=start + offset]));
                }
            }
            _ => {}
        }
    }

    Err(RunxError::MetadataParse {
        fragment: compact(&region[start..]),
        reason: "unbalanced braces".to_string(),
    })
}

fn decode(fragment: &str) -> RunxResult<ScriptMetadata> {
    serde_json::from_str(fragment).map_err(|e| RunxError::MetadataParse {
        fragment: compact(fragment),
        reason: e.to_string(),
    })
}

/// Collapse whitespace so diagnostics stay on one line
fn compact(fragment: &str) -> String {
    fragment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse the first `/// script ... ///` block
fn legacy_block(text: &str) -> Option<ScriptMetadata> {
    let body = text.match_indices("///").find_map(|(idx, _)| {
        let rest = text[idx + 3..].trim_start().strip_prefix("script")?;
        rest.starts_with(char::is_whitespace).then_some(rest)
    })?;
    let close = body.find("///")?;

    Some(ScriptMetadata {
        dependencies: legacy_dependencies(&body[..close]),
        ..ScriptMetadata::default()
    })
}

/// Collect `dependencies = [ "name@version", ... ]` entries
fn legacy_dependencies(body: &str) -> BTreeMap<String, String> {
    let list = body.match_indices("dependencies").find_map(|(idx, key)| {
        let rest = body[idx + key.len()..].trim_start();
        let rest = rest.strip_prefix('=')?.trim_start();
        let rest = rest.strip_prefix('[')?;
        rest.find(']').map(|close| &rest[..close])
    });

    list.map(quoted_strings)
        .unwrap_or_default()
        .into_iter()
        .map(|spec| {
            let (name, version) = split_spec(spec);
            (name.to_string(), version.to_string())
        })
        .collect()
}

/// Non-empty strings wrapped in `"` or `'`
fn quoted_strings(list: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = list;

    while let Some(open) = rest.find(&['"', '\''][..]) {
        let quote = rest[open..].chars().next().unwrap_or('"');
        let after = &rest[open + 1..];
        let Some(close) = after.find(quote) else {
            break;
        };
        if close > 0 {
            out.push(&after[..close]);
        }
        rest = &after[close + 1..];
    }
    out
}

/// Split `name@version` on the last `@` that does not start a scope
fn split_spec(spec: &str) -> (&str, &str) {
    let first = spec.chars().next().map_or(0, char::len_utf8);
    match spec[first..].rfind('@') {
        Some(idx) => {
            let at = first + idx;
            let version = &spec[at + 1..];
            let version = if version.is_empty() {
                LEGACY_ANY_VERSION
            } else {
                version
            };
            (&spec[..at], version)
        }
        None => (spec, LEGACY_ANY_VERSION),
    }
}
