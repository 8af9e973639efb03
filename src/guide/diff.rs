//! Draft-to-text reconciliation.
//!
//! Both texts are cut into runs of whitespace and non-whitespace, so a
//! differing word costs one record instead of one per character. Shared
//! leading and trailing runs are stripped and the middle is aligned with a
//! Myers shortest edit script, one window of segments at a time. Each block
//! of changes is trimmed to the characters that actually differ before it
//! becomes a guide record.
//!
//! Runs containing NUL can never travel inside a record, so when both sides
//! carry the same NUL runs in the same order those runs are pinned as
//! unchanged and the texts between them are aligned independently.

use super::GuideOperation;

/// Search depth for the edit script of one window.
///
/// A window whose distance exceeds it is aligned position by position
/// instead: runs equal at the same offset are kept, every other run is
/// rewritten. That costs at most one window of guide text, never the
/// whole document.
pub const MAX_EDIT_DISTANCE: usize = 1024;

/// Segments per side searched at once.
const WINDOW: usize = 4096;

const MAX_SPAN: usize = u8::MAX as usize;

/// Operations turning `draft` into `text` when replayed with
/// [`apply`](super::apply).
pub fn diff(draft: &str, text: &str) -> Vec<GuideOperation> {
    if draft == text {
        return Vec::new();
    }

    let a = segments(draft);
    let b = segments(text);

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut ops = Vec::new();
    let mut cursor: usize = a[..prefix].iter().map(|s| s.len()).sum();
    let mut removed = String::new();
    let mut added = String::new();

    for edit in anchored_edit(mid_a, mid_b) {
        match edit {
            Edit::Equal(i) => {
                flush(&mut ops, &mut cursor, &mut removed, &mut added);
                cursor += mid_a[i].len();
            }
            Edit::Delete(i) => removed.push_str(mid_a[i]),
            Edit::Insert(j) => added.push_str(mid_b[j]),
        }
    }
    flush(&mut ops, &mut cursor, &mut removed, &mut added);

    ops
}

/// Maximal runs of whitespace and non-whitespace characters.
fn segments(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let ws = c.is_whitespace();
        if prev.is_some_and(|p| p != ws) {
            out.push(&text[start..i]);
            start = i;
        }
        prev = Some(ws);
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

// ============================================================================
// Emission
// ============================================================================

/// Turn one block of removed/added text into records at `cursor`.
fn flush(ops: &mut Vec<GuideOperation>, cursor: &mut usize, removed: &mut String, added: &mut String) {
    if removed.is_empty() && added.is_empty() {
        return;
    }

    let head = common_prefix(removed, added);
    let tail = common_suffix(&removed[head..], &added[head..]);
    let old = &removed[head..removed.len() - tail];
    let new = &added[head..added.len() - tail];
    let pos = *cursor + head;

    match (old.is_empty(), new.is_empty()) {
        (true, true) => {}
        (true, false) => ops.push(GuideOperation::Insert { pos, text: new.to_string() }),
        (false, true) => push_deletes(ops, pos, old.len()),
        (false, false) if old.len() <= MAX_SPAN => ops.push(GuideOperation::Replace {
            pos,
            old_len: old.len(),
            text: new.to_string(),
        }),
        (false, false) => {
            push_deletes(ops, pos, old.len());
            ops.push(GuideOperation::Insert { pos, text: new.to_string() });
        }
    }

    *cursor += added.len();
    removed.clear();
    added.clear();
}

/// Deletes wider than one record are chained at the same position.
fn push_deletes(ops: &mut Vec<GuideOperation>, pos: usize, mut len: usize) {
    while len > 0 {
        let chunk = len.min(MAX_SPAN);
        ops.push(GuideOperation::Delete { pos, len: chunk });
        len -= chunk;
    }
}

/// Byte length of the shared leading characters.
fn common_prefix(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(c, _)| c.len_utf8())
        .sum()
}

/// Byte length of the shared trailing characters.
fn common_suffix(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .map(|(c, _)| c.len_utf8())
        .sum()
}

// ============================================================================
// Alignment
// ============================================================================

/// Edit script with NUL-bearing runs pinned, when both sides agree on them.
fn anchored_edit(a: &[&str], b: &[&str]) -> Vec<Edit> {
    let nul_a: Vec<usize> = (0..a.len()).filter(|&i| a[i].contains('\0')).collect();
    let nul_b: Vec<usize> = (0..b.len()).filter(|&j| b[j].contains('\0')).collect();
    let pinned = nul_a.len() == nul_b.len() && nul_a.iter().zip(&nul_b).all(|(&i, &j)| a[i] == b[j]);
    if !pinned {
        return windowed_edit(a, b);
    }

    let mut edits = Vec::new();
    let (mut x, mut y) = (0, 0);
    for (&i, &j) in nul_a.iter().zip(&nul_b) {
        extend_shifted(&mut edits, windowed_edit(&a[x..i], &b[y..j]), x, y);
        edits.push(Edit::Equal(i));
        (x, y) = (i + 1, j + 1);
    }
    extend_shifted(&mut edits, windowed_edit(&a[x..], &b[y..]), x, y);
    edits
}

/// Edit script searched window by window.
///
/// Each window commits its script up to the last unchanged run, so a
/// window edge never forces a spurious edit; the next window resumes there.
fn windowed_edit(a: &[&str], b: &[&str]) -> Vec<Edit> {
    let mut edits = Vec::new();
    let (mut x, mut y) = (0, 0);

    loop {
        while x < a.len() && y < b.len() && a[x] == b[y] {
            edits.push(Edit::Equal(x));
            x += 1;
            y += 1;
        }
        if x == a.len() || y == b.len() {
            edits.extend((x..a.len()).map(Edit::Delete));
            edits.extend((y..b.len()).map(Edit::Insert));
            return edits;
        }

        let end_a = a.len().min(x + WINDOW);
        let end_b = b.len().min(y + WINDOW);
        let last = end_a == a.len() && end_b == b.len();
        let script = shortest_edit(&a[x..end_a], &b[y..end_b]).unwrap_or_else(|| {
            tracing::debug!(
                draft_segments = end_a - x,
                text_segments = end_b - y,
                "edit distance above {MAX_EDIT_DISTANCE}, aligning window by position"
            );
            positional_edit(&a[x..end_a], &b[y..end_b])
        });

        let keep = if last {
            script.len()
        } else {
            script
                .iter()
                .rposition(|e| matches!(e, Edit::Equal(_)))
                .map_or(script.len(), |p| p + 1)
        };
        let (base_a, base_b) = (x, y);
        for edit in &script[..keep] {
            match edit {
                Edit::Equal(_) => {
                    x += 1;
                    y += 1;
                }
                Edit::Delete(_) => x += 1,
                Edit::Insert(_) => y += 1,
            }
        }
        extend_shifted(&mut edits, script[..keep].iter().copied(), base_a, base_b);
    }
}

/// Runs equal at the same offset are kept; the rest is rewritten.
fn positional_edit(a: &[&str], b: &[&str]) -> Vec<Edit> {
    let mut edits = Vec::with_capacity(a.len().max(b.len()) * 2);
    for i in 0..a.len().max(b.len()) {
        match (a.get(i), b.get(i)) {
            (Some(x), Some(y)) if x == y => edits.push(Edit::Equal(i)),
            (sa, sb) => {
                if sa.is_some() {
                    edits.push(Edit::Delete(i));
                }
                if sb.is_some() {
                    edits.push(Edit::Insert(i));
                }
            }
        }
    }
    edits
}

/// Append a sub-script whose indices start at `(da, db)`.
fn extend_shifted(edits: &mut Vec<Edit>, sub: impl IntoIterator<Item = Edit>, da: usize, db: usize) {
    edits.extend(sub.into_iter().map(|edit| match edit {
        Edit::Equal(i) => Edit::Equal(i + da),
        Edit::Delete(i) => Edit::Delete(i + da),
        Edit::Insert(j) => Edit::Insert(j + db),
    }));
}

// ============================================================================
// Myers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    /// Index into the draft segments.
    Equal(usize),
    /// Index into the draft segments.
    Delete(usize),
    /// Index into the text segments.
    Insert(usize),
}

/// Shortest edit script, or `None` past [`MAX_EDIT_DISTANCE`].
fn shortest_edit(a: &[&str], b: &[&str]) -> Option<Vec<Edit>> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = (n + m).min(MAX_EDIT_DISTANCE as isize);
    let offset = max + 1;
    let mut v = vec![0isize; (2 * max + 3) as usize];
    // trace[d] holds v[k] for k in -d..=d, indexed by k + d.
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'search: for d in 0..=max {
        for k in (-d..=d).step_by(2) {
            let i = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[i - 1] < v[i + 1]) {
                v[i + 1]
            } else {
                v[i - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[i] = x;
            if x >= n && y >= m {
                trace.push(v[(offset - d) as usize..=(offset + d) as usize].to_vec());
                break 'search;
            }
        }
        trace.push(v[(offset - d) as usize..=(offset + d) as usize].to_vec());
        if d == max {
            return None;
        }
    }

    Some(backtrack(&trace, n, m))
}

fn backtrack(trace: &[Vec<isize>], n: isize, m: isize) -> Vec<Edit> {
    let (mut x, mut y) = (n, m);
    let mut edits = Vec::new();

    for d in (1..trace.len() as isize).rev() {
        let prev = &trace[(d - 1) as usize];
        let at = |k: isize| prev[(k + d - 1) as usize];
        let k = x - y;
        let prev_k = if k == -d || (k != d && at(k - 1) < at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = at(prev_k);
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits.push(Edit::Equal(x as usize));
        }
        if x == prev_x {
            y -= 1;
            edits.push(Edit::Insert(y as usize));
        } else {
            x -= 1;
            edits.push(Edit::Delete(x as usize));
        }
    }
    while x > 0 && y > 0 {
        x -= 1;
        y -= 1;
        edits.push(Edit::Equal(x as usize));
    }

    edits.reverse();
    edits
}
