//! DiffRenderer - Character-level differences between two renderings
//!
//! [`SequenceMatcher`] implements Ratcliff/Obershelp matching: find the
//! longest common block, then recurse on the pieces left and right of it.
//! The matching blocks become an ordered list of [`Opcode`]s, which
//! [`render_inline_diff`] turns into one annotated string.
//!
//! Sides follow the report: `a` is the actual output, `b` the expected one.
//! An `insert` is text only the expected side has, a `delete` is text only the
//! actual side has.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::ops::Range;

use similar::TextDiff;

/// Sequences at least this long get the popular-element heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Kind of an edit operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    /// Same on both sides
    Equal,
    /// Present only in `b`
    Insert,
    /// Present only in `a`
    Delete,
    /// `a[..]` should be replaced by `b[..]`
    Replace,
}

impl OpTag {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            OpTag::Equal => "equal",
            OpTag::Insert => "insert",
            OpTag::Delete => "delete",
            OpTag::Replace => "replace",
        }
    }
}

/// One labelled span pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    /// Operation
    pub tag: OpTag,
    /// Range in `a`
    pub a: Range<usize>,
    /// Range in `b`
    pub b: Range<usize>,
}

/// A run of `size` equal elements at `a[a..]` and `b[b..]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    /// Start in `a`
    pub a: usize,
    /// Start in `b`
    pub b: usize,
    /// Length
    pub size: usize,
}

/// Ratcliff/Obershelp matcher over two slices
///
/// # Example
///
/// ```rust
/// use goldcheck::harness::{OpTag, SequenceMatcher};
///
/// let a: Vec<char> = "abc".chars().collect();
/// let b: Vec<char> = "axc".chars().collect();
/// let tags: Vec<OpTag> = SequenceMatcher::new(&a, &b)
///     .opcodes()
///     .iter()
///     .map(|op| op.tag)
///     .collect();
/// assert_eq!(tags, [OpTag::Equal, OpTag::Replace, OpTag::Equal]);
/// ```
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of each non-popular element of `b`, ascending
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Index `b` for matching against `a`.
    ///
    /// When `b` has 200 or more elements, elements occurring more than
    /// `len / 100 + 1` times are left out of the index. They can still extend
    /// a match but never seed one.
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<&'a T> = b2j
                .iter()
                .filter(|(_, idxs)| idxs.len() > limit)
                .map(|(elt, _)| *elt)
                .collect();
            b2j.retain(|elt, _| !popular.contains(elt));
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    /// A zero-sized match is returned when nothing matches.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the longest match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular elements were skipped above; let them extend the block.
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        Match {
            a: besti,
            b: bestj,
            size: bestsize,
        }
    }

    /// Non-adjacent matching blocks in increasing order, terminated by a
    /// zero-sized sentinel at `(len(a), len(b))`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
        }
        blocks.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Match {
            a: la,
            b: lb,
            size: 0,
        });
        merged
    }

    /// Edit script turning `a` into `b`, left to right.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let (mut i, mut j) = (0, 0);
        let mut ops = Vec::new();

        for m in self.matching_blocks() {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(OpTag::Replace),
                (true, false) => Some(OpTag::Delete),
                (false, true) => Some(OpTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                ops.push(Opcode {
                    tag,
                    a: i..m.a,
                    b: j..m.b,
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                ops.push(Opcode {
                    tag: OpTag::Equal,
                    a: m.a..i,
                    b: m.b..j,
                });
            }
        }
        ops
    }

    /// Similarity in `[0, 1]`: twice the matched elements over the total.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matched as f64 / total as f64
    }
}

/// Marker strings wrapped around changed spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffMarkers {
    /// Opens an expected-only span
    pub insert_open: &'static str,
    /// Closes an expected-only span
    pub insert_close: &'static str,
    /// Opens an actual-only span
    pub delete_open: &'static str,
    /// Closes an actual-only span
    pub delete_close: &'static str,
}

impl DiffMarkers {
    /// Black on green for insertions, black on red for deletions.
    pub const ANSI: Self = Self {
        insert_open: "\x1b[38;5;16;48;5;2m",
        insert_close: "\x1b[0m",
        delete_open: "\x1b[38;5;16;48;5;1m",
        delete_close: "\x1b[0m",
    };

    /// Plain text markers for terminals without colour.
    pub const PLAIN: Self = Self {
        insert_open: "{+",
        insert_close: "+}",
        delete_open: "[-",
        delete_close: "-]",
    };

    /// Pick the marker set for a colour setting.
    pub fn for_color(color: bool) -> Self {
        if color { Self::ANSI } else { Self::PLAIN }
    }
}

/// Character opcodes between `actual` and `expected`.
pub fn char_opcodes(actual: &str, expected: &str) -> Vec<Opcode> {
    let a: Vec<char> = actual.chars().collect();
    let b: Vec<char> = expected.chars().collect();
    SequenceMatcher::new(&a, &b).opcodes()
}

/// Annotated character diff of `actual` against `expected`.
///
/// Equal spans are copied, expected-only text is wrapped in the insertion
/// markers, actual-only text in the deletion markers. A replacement shows the
/// expected text first.
pub fn render_inline_diff(actual: &str, expected: &str, markers: DiffMarkers) -> String {
    let a: Vec<char> = actual.chars().collect();
    let b: Vec<char> = expected.chars().collect();
    let mut out = String::with_capacity(actual.len() + expected.len());

    for op in SequenceMatcher::new(&a, &b).opcodes() {
        let a_span: String = a[op.a.clone()].iter().collect();
        let b_span: String = b[op.b.clone()].iter().collect();
        match op.tag {
            OpTag::Equal => out.push_str(&a_span),
            OpTag::Insert => push_marked(&mut out, &b_span, markers.insert_open, markers.insert_close),
            OpTag::Delete => push_marked(&mut out, &a_span, markers.delete_open, markers.delete_close),
            OpTag::Replace => {
                push_marked(&mut out, &b_span, markers.insert_open, markers.insert_close);
                push_marked(&mut out, &a_span, markers.delete_open, markers.delete_close);
            }
        }
    }
    out
}

fn push_marked(out: &mut String, span: &str, open: &str, close: &str) {
    out.push_str(open);
    out.push_str(span);
    out.push_str(close);
}

/// Line-level unified diff from expected to actual.
pub fn render_unified_diff(actual: &str, expected: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut result = String::new();

    result.push_str("--- expected\n");
    result.push_str("+++ actual\n");

    for hunk in diff.unified_diff().iter_hunks() {
        result.push_str(&format!("{hunk}"));
    }

    result
}
