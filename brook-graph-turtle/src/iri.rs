//! Relative IRI resolution (RFC 3986 section 5).

use crate::error::{Result, TurtleError};

/// Components of an IRI reference; `None` means "not present", which
/// differs from present-but-empty (`?` with nothing after it).
struct IriRef<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

impl<'a> IriRef<'a> {
    fn split(iri: &'a str) -> Self {
        let (rest, fragment) = match iri.find('#') {
            Some(pos) => (&iri[..pos], Some(&iri[pos + 1..])),
            None => (iri, None),
        };
        let (rest, query) = match rest.find('?') {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };
        let (scheme, rest) = match scheme_end(rest) {
            Some(pos) => (Some(&rest[..pos]), &rest[pos + 1..]),
            None => (None, rest),
        };
        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find('/').unwrap_or(after.len());
                (Some(&after[..end]), &after[end..])
            }
            None => (None, rest),
        };
        Self {
            scheme,
            authority,
            path,
            query,
            fragment,
        }
    }
}

/// Byte offset of the `:` ending a scheme, if `s` starts with one.
fn scheme_end(s: &str) -> Option<usize> {
    let colon = s.find(':')?;
    let mut chars = s[..colon].chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return None,
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(colon)
}

/// Whether `iri` carries a scheme, i.e. needs no base.
pub fn is_absolute(iri: &str) -> bool {
    scheme_end(iri).is_some()
}

/// Resolve `reference` against `base`.
///
/// Absolute references are returned unchanged. A relative reference without
/// a usable base is an [`TurtleError::IriResolution`].
pub fn resolve(base: Option<&str>, reference: &str) -> Result<String> {
    if is_absolute(reference) {
        return Ok(reference.to_string());
    }

    let base = base.ok_or_else(|| {
        TurtleError::IriResolution(format!("relative IRI <{}> without base", reference))
    })?;
    let b = IriRef::split(base);
    let scheme = b.scheme.ok_or_else(|| {
        TurtleError::IriResolution(format!("base IRI <{}> is not absolute", base))
    })?;
    let r = IriRef::split(reference);

    let (authority, path, query) = if r.authority.is_some() {
        (r.authority, remove_dot_segments(r.path), r.query)
    } else if r.path.is_empty() {
        (b.authority, b.path.to_string(), r.query.or(b.query))
    } else if r.path.starts_with('/') {
        (b.authority, remove_dot_segments(r.path), r.query)
    } else {
        let merged = if b.authority.is_some() && b.path.is_empty() {
            format!("/{}", r.path)
        } else {
            let dir = match b.path.rfind('/') {
                Some(pos) => &b.path[..=pos],
                None => "",
            };
            format!("{}{}", dir, r.path)
        };
        (b.authority, remove_dot_segments(&merged), r.query)
    };

    let mut out = String::with_capacity(base.len() + reference.len());
    out.push_str(scheme);
    out.push(':');
    if let Some(auth) = authority {
        out.push_str("//");
        out.push_str(auth);
    }
    out.push_str(&path);
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    if let Some(f) = r.fragment {
        out.push('#');
        out.push_str(f);
    }
    Ok(out)
}

/// Remove dot segments from a path (RFC 3986 section 5.2.4).
fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let skip = usize::from(input.starts_with('/'));
            let end = input[skip..]
                .find('/')
                .map(|pos| pos + skip)
                .unwrap_or(input.len());
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }

    output
}

fn pop_segment(output: &mut String) {
    match output.rfind('/') {
        Some(pos) => output.truncate(pos),
        None => output.clear(),
    }
}
