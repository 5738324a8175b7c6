#![forbid(unsafe_code)]

//! Edit-script computation.
//!
//! [`diff`] works in three stages:
//!
//! 1. Strip the common prefix and suffix. Most edits touch a small window of
//!    a large sequence, so this usually leaves very little to compare.
//! 2. If what remains has equal length on both sides, compare it position by
//!    position and emit a `Replace` for every differing element. Field
//!    updates over a tile grid land here and cost O(n).
//! 3. Otherwise run Myers' O(ND) shortest-edit-script search on the middle,
//!    then fold each delete immediately followed by an insert into a single
//!    `Replace`.
//!
//! # Invariants
//!
//! - `apply(old, &diff(old, new))` yields `new`.
//! - Identical inputs produce an empty patch.
//! - Operations are emitted in ascending position order.

use crate::edit::{EditOp, Patch};

/// Compute a patch that turns `old` into `new`.
#[must_use]
pub fn diff<T: PartialEq + Clone>(old: &[T], new: &[T]) -> Patch<T> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let old_rest = &old[prefix..];
    let new_rest = &new[prefix..];
    let suffix = old_rest
        .iter()
        .rev()
        .zip(new_rest.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let a = &old_rest[..old_rest.len() - suffix];
    let b = &new_rest[..new_rest.len() - suffix];

    let mut ops = Vec::new();
    if a.len() == b.len() {
        for (offset, (x, y)) in a.iter().zip(b).enumerate() {
            if x != y {
                ops.push(EditOp::Replace {
                    index: prefix + offset,
                    value: y.clone(),
                });
            }
        }
    } else {
        emit_ops(&shortest_edit_script(a, b), b, prefix, &mut ops);
    }

    tracing::trace!(
        old_len = old.len(),
        new_len = new.len(),
        prefix,
        suffix,
        ops = ops.len(),
        "computed sequence diff"
    );
    Patch::new(ops)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep,
    Delete,
    /// Insert `b[j]`.
    Insert(usize),
}

/// Furthest-reaching x per diagonal, captured before each round `d`.
///
/// Only diagonals `-d..=d` are kept; backtracking never looks further out.
struct Frontier {
    d: isize,
    xs: Vec<isize>,
}

impl Frontier {
    fn at(&self, k: isize) -> isize {
        self.xs[(k + self.d) as usize]
    }
}

fn shortest_edit_script<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Step> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max = n + m;
    let offset = max;
    let mut v = vec![0isize; 2 * max as usize + 2];
    let mut trace: Vec<Frontier> = Vec::new();

    'search: for d in 0..=max {
        trace.push(Frontier {
            d,
            xs: v[(offset - d) as usize..=(offset + d) as usize].to_vec(),
        });
        let mut k = -d;
        while k <= d {
            let idx = (k + offset) as usize;
            let mut x = if k == -d || (k != d && v[idx - 1] < v[idx + 1]) {
                v[idx + 1]
            } else {
                v[idx - 1] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[idx] = x;
            if x >= n && y >= m {
                break 'search;
            }
            k += 2;
        }
    }

    let mut steps = Vec::with_capacity((n + m) as usize);
    let (mut x, mut y) = (n, m);
    for frontier in trace.iter().rev() {
        let d = frontier.d;
        let k = x - y;
        let prev_k = if k == -d || (k != d && frontier.at(k - 1) < frontier.at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = if d == 0 { 0 } else { frontier.at(prev_k) };
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            steps.push(Step::Keep);
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            if x == prev_x {
                steps.push(Step::Insert((y - 1) as usize));
            } else {
                steps.push(Step::Delete);
            }
        }
        x = prev_x;
        y = prev_y;
    }
    steps.reverse();
    steps
}

fn emit_ops<T: Clone>(steps: &[Step], b: &[T], start: usize, ops: &mut Vec<EditOp<T>>) {
    let mut pos = start;
    let mut steps = steps.iter().copied().peekable();
    while let Some(step) = steps.next() {
        match step {
            Step::Keep => pos += 1,
            Step::Delete => {
                if let Some(Step::Insert(j)) = steps.peek().copied() {
                    steps.next();
                    ops.push(EditOp::Replace {
                        index: pos,
                        value: b[j].clone(),
                    });
                    pos += 1;
                } else {
                    ops.push(EditOp::Remove { index: pos });
                }
            }
            Step::Insert(j) => {
                ops.push(EditOp::Insert {
                    index: pos,
                    value: b[j].clone(),
                });
                pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply;

    fn roundtrip(old: &[char], new: &[char]) -> Patch<char> {
        let patch = diff(old, new);
        let (patched, inverse) = apply(old, &patch).unwrap();
        assert_eq!(patched, new, "forward patch");
        let (restored, _) = apply(&patched, &inverse).unwrap();
        assert_eq!(restored, old, "inverse patch");
        patch
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn identical_sequences_produce_empty_patch() {
        let seq = chars("abcdef");
        assert!(diff(&seq, &seq).is_empty());
    }

    #[test]
    fn equal_length_changes_are_replacements() {
        let patch = roundtrip(&chars("abcdef"), &chars("abXdeY"));
        assert_eq!(
            patch.ops(),
            &[
                EditOp::Replace {
                    index: 2,
                    value: 'X'
                },
                EditOp::Replace {
                    index: 5,
                    value: 'Y'
                },
            ]
        );
    }

    #[test]
    fn single_insert_in_middle() {
        let patch = roundtrip(&chars("abcd"), &chars("abXcd"));
        assert_eq!(
            patch.ops(),
            &[EditOp::Insert {
                index: 2,
                value: 'X'
            }]
        );
    }

    #[test]
    fn single_remove_at_front() {
        let patch = roundtrip(&chars("abcd"), &chars("bcd"));
        assert_eq!(patch.ops(), &[EditOp::Remove { index: 0 }]);
    }

    #[test]
    fn append_and_truncate() {
        roundtrip(&chars("abc"), &chars("abcdef"));
        roundtrip(&chars("abcdef"), &chars("abc"));
    }

    #[test]
    fn empty_to_full_and_back() {
        let patch = roundtrip(&[], &chars("xyz"));
        assert_eq!(patch.len(), 3);
        let patch = roundtrip(&chars("xyz"), &[]);
        assert_eq!(patch.len(), 3);
    }

    #[test]
    fn classic_myers_example() {
        // ABCABBA -> CBABAC has edit distance 5.
        let patch = roundtrip(&chars("ABCABBA"), &chars("CBABAC"));
        assert!(patch.len() <= 5, "patch too long: {:?}", patch.ops());
    }

    #[test]
    fn mixed_edits_with_length_change() {
        roundtrip(&chars("the quick brown fox"), &chars("a quick red fox jumps"));
        roundtrip(&chars("aaaa"), &chars("aabaa"));
        roundtrip(&chars("abab"), &chars("baba"));
    }

    #[test]
    fn ops_are_in_ascending_position_order() {
        let patch = diff(&chars("abcdefgh"), &chars("aXcdeYgZh"));
        let indices: Vec<usize> = patch.ops().iter().map(EditOp::index).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }
}
