//! Guide wire format.
//!
//! All multi-byte integers are **big-endian**.
//!
//! ```text
//! Header (3 bytes)
//!   [version: u8][stream_len: u16]
//!
//! Records (opcode first)
//!   0x01 REPLACE       [pos: u16][old_len: u8][text: utf-8][0x00]
//!   0x02 INSERT        [pos: u16][text: utf-8][0x00]
//!   0x03 DELETE        [pos: u16][len: u8]                 4 bytes
//!   0x10 DISAMBIGUATE  [choice: u8][node_ref: u16]         4 bytes
//!   0x11 SPECIFY       [node_ref: u16][text: utf-8][0x00]
//!   0x20 CONTEXT_START                                     1 byte, reserved
//!   0x21 CONTEXT_END                                       1 byte, reserved
//! ```
//!
//! Decoding is a single forward scan that never reads past `stream_len`.
//! An unknown opcode, or a reserved context marker, stops the scan softly:
//! the operations parsed so far are returned together with a [`GuideStop`].
//! Truncated records and missing terminators are hard `CorruptGuide` errors.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use super::{GuideOperation, Opcode};
use crate::model::SemanticNodeId;
use crate::{Error, Result};

/// Current guide format version.
pub const GUIDE_VERSION: u8 = 1;

/// Header size: version + 16-bit stream length.
pub const HEADER_LEN: usize = 3;

const MAX_U8: usize = u8::MAX as usize;
const MAX_U16: usize = u16::MAX as usize;
const TERMINATOR: u8 = 0x00;

// ============================================================================
// Encode
// ============================================================================

/// Encode operations into a guide.
///
/// Fails without emitting anything if any field exceeds its wire width or a
/// text contains the NUL terminator.
pub fn encode(version: u8, ops: &[GuideOperation]) -> Result<Vec<u8>> {
    let stream_len: usize = ops.iter().map(GuideOperation::encoded_len).sum();
    check_width("stream_len", stream_len, MAX_U16)?;

    let mut buf = BytesMut::with_capacity(HEADER_LEN + stream_len);
    buf.put_u8(version);
    buf.put_u16(stream_len as u16);

    for op in ops {
        buf.put_u8(op.opcode().byte());
        match op {
            GuideOperation::Replace { pos, old_len, text } => {
                buf.put_u16(narrow_u16("position", *pos)?);
                buf.put_u8(narrow_u8("old_len", *old_len)?);
                put_text(&mut buf, Opcode::Replace, text)?;
            }
            GuideOperation::Insert { pos, text } => {
                buf.put_u16(narrow_u16("position", *pos)?);
                put_text(&mut buf, Opcode::Insert, text)?;
            }
            GuideOperation::Delete { pos, len } => {
                buf.put_u16(narrow_u16("position", *pos)?);
                buf.put_u8(narrow_u8("len", *len)?);
            }
            GuideOperation::Disambiguate { node_ref, choice } => {
                buf.put_u8(*choice);
                buf.put_u16(narrow_u16("node_ref", node_ref.index())?);
            }
            GuideOperation::Specify { node_ref, text } => {
                buf.put_u16(narrow_u16("node_ref", node_ref.index())?);
                put_text(&mut buf, Opcode::Specify, text)?;
            }
            GuideOperation::ContextStart | GuideOperation::ContextEnd => {}
        }
    }

    debug_assert_eq!(buf.len(), HEADER_LEN + stream_len);
    tracing::trace!(ops = ops.len(), bytes = buf.len(), "guide encoded");
    Ok(buf.to_vec())
}

fn check_width(field: &'static str, value: usize, max: usize) -> Result<()> {
    if value > max {
        return Err(Error::FieldOverflow { field, value, max });
    }
    Ok(())
}

fn narrow_u16(field: &'static str, value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::FieldOverflow { field, value, max: MAX_U16 })
}

fn narrow_u8(field: &'static str, value: usize) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::FieldOverflow { field, value, max: MAX_U8 })
}

fn put_text(buf: &mut BytesMut, opcode: Opcode, text: &str) -> Result<()> {
    if text.as_bytes().contains(&TERMINATOR) {
        return Err(Error::EmbeddedNul { opcode: opcode.name() });
    }
    buf.put_slice(text.as_bytes());
    buf.put_u8(TERMINATOR);
    Ok(())
}

// ============================================================================
// Decode
// ============================================================================

/// Why a decode scan ended before the declared stream length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideStop {
    /// Opcode byte this decoder does not know.
    UnknownOpcode { offset: usize, opcode: u8 },
    /// Reserved context marker, not consumed by this decoder version.
    ReservedMarker { offset: usize, opcode: Opcode },
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedGuide {
    pub version: u8,
    pub operations: Vec<GuideOperation>,
    /// Set when the scan stopped early on an opcode it could not consume.
    pub stop: Option<GuideStop>,
}

impl DecodedGuide {
    pub fn is_complete(&self) -> bool {
        self.stop.is_none()
    }
}

/// Bounded forward reader over the operation stream.
struct Reader<'a> {
    stream: &'a [u8],
    pos: usize,
    ops: Vec<GuideOperation>,
}

impl<'a> Reader<'a> {
    /// Byte offset within the whole guide, header included.
    fn offset(&self) -> usize {
        HEADER_LEN + self.pos
    }

    fn corrupt(self, at: usize, reason: impl Into<String>) -> Error {
        Error::CorruptGuide {
            offset: HEADER_LEN + at,
            reason: reason.into(),
            recovered: self.ops,
        }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.stream.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn u16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    /// NUL-terminated UTF-8 text; the terminator is consumed.
    fn text(&mut self) -> std::result::Result<String, &'static str> {
        let rest = &self.stream[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == TERMINATOR)
            .ok_or("missing NUL terminator")?;
        let text = std::str::from_utf8(&rest[..len]).map_err(|_| "text is not valid UTF-8")?;
        self.pos += len + 1;
        Ok(text.to_string())
    }
}

/// Decode a guide.
pub fn decode(data: &[u8]) -> Result<DecodedGuide> {
    if data.len() < HEADER_LEN {
        return Err(Error::CorruptGuide {
            offset: 0,
            reason: format!("header needs {HEADER_LEN} bytes, got {}", data.len()),
            recovered: Vec::new(),
        });
    }
    let version = data[0];
    let declared = u16::from_be_bytes([data[1], data[2]]) as usize;
    let available = data.len() - HEADER_LEN;
    if declared > available {
        return Err(Error::CorruptGuide {
            offset: 1,
            reason: format!("stream length {declared} exceeds the {available} bytes present"),
            recovered: Vec::new(),
        });
    }
    if available > declared {
        tracing::debug!(trailing = available - declared, "ignoring bytes after guide stream");
    }

    let mut r = Reader {
        stream: &data[HEADER_LEN..HEADER_LEN + declared],
        pos: 0,
        ops: Vec::new(),
    };
    let mut stop = None;

    while r.pos < r.stream.len() {
        let start = r.pos;
        let byte = r.stream[start];
        r.pos += 1;

        let Some(opcode) = Opcode::from_byte(byte) else {
            tracing::warn!(offset = r.offset() - 1, opcode = byte, "unknown guide opcode, stopping");
            stop = Some(GuideStop::UnknownOpcode { offset: HEADER_LEN + start, opcode: byte });
            break;
        };

        let op = match opcode {
            Opcode::Replace => {
                let (Some(pos), Some(old_len)) = (r.u16(), r.u8()) else {
                    return Err(r.corrupt(start, "truncated REPLACE record"));
                };
                match r.text() {
                    Ok(text) => GuideOperation::Replace {
                        pos: pos as usize,
                        old_len: old_len as usize,
                        text,
                    },
                    Err(reason) => return Err(r.corrupt(start, format!("REPLACE: {reason}"))),
                }
            }
            Opcode::Insert => {
                let Some(pos) = r.u16() else {
                    return Err(r.corrupt(start, "truncated INSERT record"));
                };
                match r.text() {
                    Ok(text) => GuideOperation::Insert { pos: pos as usize, text },
                    Err(reason) => return Err(r.corrupt(start, format!("INSERT: {reason}"))),
                }
            }
            Opcode::Delete => {
                let (Some(pos), Some(len)) = (r.u16(), r.u8()) else {
                    return Err(r.corrupt(start, "truncated DELETE record"));
                };
                GuideOperation::Delete { pos: pos as usize, len: len as usize }
            }
            Opcode::Disambiguate => {
                let (Some(choice), Some(node)) = (r.u8(), r.u16()) else {
                    return Err(r.corrupt(start, "truncated DISAMBIGUATE record"));
                };
                GuideOperation::Disambiguate {
                    node_ref: SemanticNodeId(node as u32),
                    choice,
                }
            }
            Opcode::Specify => {
                let Some(node) = r.u16() else {
                    return Err(r.corrupt(start, "truncated SPECIFY record"));
                };
                match r.text() {
                    Ok(text) => GuideOperation::Specify {
                        node_ref: SemanticNodeId(node as u32),
                        text,
                    },
                    Err(reason) => return Err(r.corrupt(start, format!("SPECIFY: {reason}"))),
                }
            }
            Opcode::ContextStart | Opcode::ContextEnd => {
                tracing::debug!(offset = HEADER_LEN + start, %opcode, "reserved context marker, stopping");
                stop = Some(GuideStop::ReservedMarker { offset: HEADER_LEN + start, opcode });
                break;
            }
        };
        r.ops.push(op);
    }

    Ok(DecodedGuide {
        version,
        operations: r.ops,
        stop,
    })
}
