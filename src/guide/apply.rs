//! Replay guide operations over a draft.
//!
//! Operations run in order against a byte buffer. Positions address the
//! buffer as patched so far, so intermediate states may split a UTF-8
//! sequence; only the final text has to be valid.

use crate::model::SemanticGraph;
use crate::{Error, Result};

use super::GuideOperation;

/// Apply `ops` to `draft`.
///
/// Semantic patches (`Disambiguate`, `Specify`) and context markers leave
/// the text unchanged.
pub fn apply(draft: &str, ops: &[GuideOperation]) -> Result<String> {
    let mut buf = draft.as_bytes().to_vec();

    for (index, op) in ops.iter().enumerate() {
        match op {
            GuideOperation::Replace { pos, old_len, text } => {
                let end = span_end(index, *pos, *old_len, buf.len())?;
                buf.splice(*pos..end, text.bytes());
            }
            GuideOperation::Insert { pos, text } => {
                if *pos > buf.len() {
                    return Err(out_of_bounds(index, *pos, buf.len()));
                }
                buf.splice(*pos..*pos, text.bytes());
            }
            GuideOperation::Delete { pos, len } => {
                let end = span_end(index, *pos, *len, buf.len())?;
                buf.drain(*pos..end);
            }
            GuideOperation::Disambiguate { .. }
            | GuideOperation::Specify { .. }
            | GuideOperation::ContextStart
            | GuideOperation::ContextEnd => {}
        }
    }

    String::from_utf8(buf).map_err(|e| Error::GuideApplication {
        index: ops.len(),
        reason: format!("patched text is not valid UTF-8: {e}"),
    })
}

/// Like [`apply`], but first checks that every node reference resolves in
/// `graph`.
pub fn apply_checked(draft: &str, ops: &[GuideOperation], graph: &SemanticGraph) -> Result<String> {
    for (index, op) in ops.iter().enumerate() {
        let node_ref = match op {
            GuideOperation::Disambiguate { node_ref, .. } | GuideOperation::Specify { node_ref, .. } => {
                *node_ref
            }
            _ => continue,
        };
        if !graph.contains(node_ref) {
            return Err(Error::GuideApplication {
                index,
                reason: format!("node {node_ref} not in graph of {} nodes", graph.node_count()),
            });
        }
    }
    apply(draft, ops)
}

fn span_end(index: usize, pos: usize, len: usize, buf_len: usize) -> Result<usize> {
    match pos.checked_add(len) {
        Some(end) if end <= buf_len => Ok(end),
        _ => Err(Error::GuideApplication {
            index,
            reason: format!("span {pos}+{len} exceeds text length {buf_len}"),
        }),
    }
}

fn out_of_bounds(index: usize, pos: usize, buf_len: usize) -> Error {
    Error::GuideApplication {
        index,
        reason: format!("position {pos} beyond text length {buf_len}"),
    }
}
