//! String interpolation for command templates and job scripts.
//!
//! Two placeholder syntaxes live here:
//!
//! - Command templates use single braces (`qsub{directives} {job_script}`)
//!   and are strict: a placeholder whose key is missing from the context
//!   fails immediately.
//! - Job scripts use double braces (`{{name}}`). Rendering substitutes the
//!   names it knows, leaves the rest intact, then re-scans the *rendered*
//!   output and fails if any placeholder survived. The re-scan also catches
//!   placeholders smuggled in through substituted values.

use std::collections::BTreeMap;

use crate::error::{BatchError, BatchResult};

/// Byte length of the leading ASCII identifier in `s` (zero if none).
fn ident_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    if bytes.is_empty() || !(bytes[0].is_ascii_alphabetic() || bytes[0] == b'_') {
        return 0;
    }
    let mut len = 1;
    while len < bytes.len() && (bytes[len].is_ascii_alphanumeric() || bytes[len] == b'_') {
        len += 1;
    }
    len
}

/// Parse a `{name}` placeholder at the start of `s`.
///
/// Returns the name and the number of bytes consumed, or `None` when `s`
/// does not start a well-formed placeholder (the brace is then literal).
fn parse_command_placeholder(s: &str) -> Option<(&str, usize)> {
    let inner = s.strip_prefix('{')?;
    let name_len = ident_len(inner);
    if name_len == 0 || !inner[name_len..].starts_with('}') {
        return None;
    }
    Some((&inner[..name_len], name_len + 2))
}

/// Parse a `{{ name }}` placeholder (inner whitespace optional) at the
/// start of `s`.
fn parse_script_placeholder(s: &str) -> Option<(&str, usize)> {
    if !s.starts_with("{{") {
        return None;
    }
    let bytes = s.as_bytes();
    let mut i = 2;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    let name_len = ident_len(&s[i..]);
    if name_len == 0 {
        return None;
    }
    let name = &s[i..i + name_len];
    i += name_len;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    if !s[i..].starts_with("}}") {
        return None;
    }
    Some((name, i + 2))
}

/// Interpolate a single-brace command template.
///
/// Every placeholder must have a context entry; unused context keys are
/// fine. Substituted values are inserted verbatim and never re-scanned.
pub(crate) fn interpolate(
    template: &str,
    context: &BTreeMap<String, String>,
) -> BatchResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut missing: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match parse_command_placeholder(tail) {
            Some((name, consumed)) => {
                match context.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        if !missing.iter().any(|n| n == name) {
                            missing.push(name.to_string());
                        }
                    }
                }
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    if !missing.is_empty() {
        return Err(BatchError::UndefinedVariable { names: missing });
    }
    Ok(out)
}

/// Render a double-brace job-script template.
///
/// Unknown placeholders are left in place during substitution; the rendered
/// output is then re-scanned and any remaining placeholder fails the render
/// with every undefined name collected.
pub(crate) fn render_script(
    template: &str,
    context: &BTreeMap<String, String>,
) -> BatchResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find("{{") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match parse_script_placeholder(tail) {
            Some((name, consumed)) => {
                match context.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&tail[..consumed]),
                }
                rest = &tail[consumed..];
            }
            None => {
                out.push_str("{{");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);

    let undefined = undefined_variables(&out);
    if !undefined.is_empty() {
        return Err(BatchError::UndefinedVariable { names: undefined });
    }
    Ok(out)
}

/// Collect the names of all `{{name}}` placeholders in `text`, in order of
/// first appearance.
pub(crate) fn undefined_variables(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find("{{") {
        let tail = &rest[pos..];
        match parse_script_placeholder(tail) {
            Some((name, consumed)) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &tail[consumed..];
            }
            None => rest = &tail[2..],
        }
    }
    names
}
