//! Reversible blank-node label encoding.
//!
//! Writers emit `_:` followed by [`encode_label`] of the node identity. The
//! encoded form is `B` followed by the lowercase hex of the identity's UTF-8
//! bytes, which is always a valid Turtle/N-Triples label whatever characters
//! the identity contains. A label-encoded allocator reverses it with
//! [`decode_label`] and so restores the exact identities across a write/read
//! round trip.

use crate::BlankId;

const MARKER: char = 'B';

/// Encode a blank-node identity as a syntactically safe label.
pub fn encode_label(id: &BlankId) -> String {
    let mut out = String::with_capacity(1 + id.as_str().len() * 2);
    out.push(MARKER);
    out.push_str(&hex::encode(id.as_str().as_bytes()));
    out
}

/// Decode a label produced by [`encode_label`].
///
/// Returns `None` for labels that are not in the encoded format.
pub fn decode_label(label: &str) -> Option<BlankId> {
    let hex_part = label.strip_prefix(MARKER)?;
    if hex_part.is_empty() {
        return None;
    }
    let bytes = hex::decode(hex_part).ok()?;
    let id = String::from_utf8(bytes).ok()?;
    Some(BlankId::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_label_is_reversible() {
        let id = BlankId::new("~b7 with spaces");
        let label = encode_label(&id);
        assert!(label.starts_with('B'));
        assert!(label[1..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(decode_label(&label), Some(id));
    }

    #[test]
    fn test_decode_rejects_foreign_labels() {
        assert_eq!(decode_label("b0"), None);
        assert_eq!(decode_label("B"), None);
        assert_eq!(decode_label("Bxyz"), None);
        assert_eq!(decode_label("B0"), None);
    }
}
