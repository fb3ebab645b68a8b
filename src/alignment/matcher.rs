/*!
 * Longest-matching-block sequence matcher.
 *
 * Decomposes two sequences into maximal equal blocks by repeatedly taking the
 * longest common contiguous run and recursing on both sides of it, then turns
 * the blocks into an edit script of tagged opcodes.
 *
 * Among equally long candidate runs the one starting earliest in `a` wins,
 * then the one starting earliest in `b`. Scores built on top of this are
 * sensitive to that choice, so it must not change.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::Range;

/// Minimum length of `b` before the popular-element heuristic kicks in
pub const POPULAR_MIN_LEN: usize = 200;

/// A run of `size` equal elements starting at `a[a]` and `b[b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Match {
    /// Start index in the first sequence
    pub a: usize,
    /// Start index in the second sequence
    pub b: usize,
    /// Length of the run
    pub size: usize,
}

impl Match {
    fn new(a: usize, b: usize, size: usize) -> Self {
        Self { a, b, size }
    }
}

/// Edit operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpcodeTag {
    /// Both ranges non-empty and element-wise identical
    Equal,
    /// Both ranges non-empty and different
    Replace,
    /// Only the first range is non-empty
    Delete,
    /// Only the second range is non-empty
    Insert,
}

impl fmt::Display for OpcodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpcodeTag::Equal => f.pad("equal"),
            OpcodeTag::Replace => f.pad("replace"),
            OpcodeTag::Delete => f.pad("delete"),
            OpcodeTag::Insert => f.pad("insert"),
        }
    }
}

/// A tagged pair of intervals `a[i1..i2]` / `b[j1..j2]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    pub tag: OpcodeTag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}

impl Opcode {
    /// Interval in the first (target) sequence
    pub fn target_range(&self) -> Range<usize> {
        self.i1..self.i2
    }

    /// Interval in the second (transcript) sequence
    pub fn transcript_range(&self) -> Range<usize> {
        self.j1..self.j2
    }
}

/// Matcher over two borrowed sequences
#[derive(Debug)]
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    /// Positions of every indexed element of `b`, ascending
    b2j: HashMap<&'a T, Vec<usize>>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Create a matcher with every element of `b` eligible to seed a match
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        Self::with_popular_word_heuristic(a, b, false)
    }

    /// Create a matcher, optionally ignoring very frequent elements of `b`
    ///
    /// When enabled and `b` has at least [`POPULAR_MIN_LEN`] elements, any
    /// element occurring more than `len(b) / 100 + 1` times is left out of the
    /// index. Such elements can still extend a match found through others.
    pub fn with_popular_word_heuristic(a: &'a [T], b: &'a [T], enabled: bool) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, element) in b.iter().enumerate() {
            b2j.entry(element).or_default().push(j);
        }

        if enabled && b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b2j }
    }

    /// Longest equal run in `a[alo..ahi]` and `b[blo..bhi]`
    ///
    /// Returns a zero-sized match at `(alo, blo)` when nothing matches.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the run ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len = HashMap::new();
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
                    new_j2len.insert(j, k);
                    // Strict comparison keeps the earliest run on ties
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Only grows when elements were dropped from the index
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        Match::new(best_i, best_j, best_size)
    }

    /// All maximal matching blocks, sorted, with adjacent blocks merged
    ///
    /// The list always ends with the sentinel `(len(a), len(b), 0)`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());

        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let found = self.find_longest_match(alo, ahi, blo, bhi);
            if found.size == 0 {
                continue;
            }
            blocks.push(found);
            if alo < found.a && blo < found.b {
                queue.push((alo, found.a, blo, found.b));
            }
            if found.a + found.size < ahi && found.b + found.size < bhi {
                queue.push((found.a + found.size, ahi, found.b + found.size, bhi));
            }
        }
        blocks.sort();

        let mut merged = Vec::with_capacity(blocks.len() + 1);
        let mut current = Match::new(0, 0, 0);
        for block in blocks {
            if current.a + current.size == block.a && current.b + current.size == block.b {
                current.size += block.size;
            } else {
                if current.size > 0 {
                    merged.push(current);
                }
                current = block;
            }
        }
        if current.size > 0 {
            merged.push(current);
        }
        merged.push(Match::new(la, lb, 0));

        merged
    }

    /// Edit script turning `a` into `b`, covering both sequences in order
    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes = Vec::new();
        let (mut i, mut j) = (0, 0);

        for block in self.matching_blocks() {
            let tag = match (i < block.a, j < block.b) {
                (true, true) => Some(OpcodeTag::Replace),
                (true, false) => Some(OpcodeTag::Delete),
                (false, true) => Some(OpcodeTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode { tag, i1: i, i2: block.a, j1: j, j2: block.b });
            }

            i = block.a + block.size;
            j = block.b + block.size;
            if block.size > 0 {
                opcodes.push(Opcode {
                    tag: OpcodeTag::Equal,
                    i1: block.a,
                    i2: i,
                    j1: block.b,
                    j2: j,
                });
            }
        }

        opcodes
    }

    /// Similarity in `[0, 1]`: twice the matched elements over the total
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matches: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matches as f64 / total as f64
    }
}
