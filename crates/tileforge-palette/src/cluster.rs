#![forbid(unsafe_code)]

//! Greedy agglomerative ordering of colors.
//!
//! Every color starts as a one-leaf chain. The two chains whose end points
//! are closest get joined end to end, in whichever of four orientations
//! gives the shortest junction, until a single chain remains. Reading that
//! chain left to right yields an order where neighbors are similar.
//!
//! This is a heuristic: no claim is made about minimal total path length.
//!
//! # Determinism
//!
//! Leaves are shuffled before merging, which decides between equally close
//! pairs. With [`ClusterConfig::seed`] unset the shuffle is OS-seeded and two
//! runs over the same input may differ; with a seed the output is stable.

use std::cmp::Ordering;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::space::{ColorSpace, Coords, centroid};

/// Clustering knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClusterConfig {
    /// Seed for the pre-merge shuffle. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl ClusterConfig {
    /// Config with a fixed shuffle seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

/// A leaf (one color) or a chain of leaves.
///
/// Chains store their leaves flattened in merge order, so the first and last
/// child are the chain's end points.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorNode {
    coords: Coords,
    color: Option<usize>,
    children: Vec<ColorNode>,
}

impl ColorNode {
    /// A leaf for input position `id`.
    #[must_use]
    pub fn leaf(id: usize, coords: Coords) -> Self {
        Self {
            coords,
            color: Some(id),
            children: Vec::new(),
        }
    }

    fn chain(children: Vec<ColorNode>) -> Self {
        let coords = centroid(children.iter().map(|leaf| &leaf.coords));
        Self {
            coords,
            color: None,
            children,
        }
    }

    /// Point for a leaf; centroid of every leaf for a chain.
    #[must_use]
    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    /// Input position of a leaf.
    #[must_use]
    pub fn color(&self) -> Option<usize> {
        self.color
    }

    /// Leaves in chain order. A leaf is its own single leaf.
    #[must_use]
    pub fn leaves(&self) -> &[ColorNode] {
        if self.children.is_empty() {
            std::slice::from_ref(self)
        } else {
            &self.children
        }
    }

    fn first(&self) -> &Coords {
        &self.leaves()[0].coords
    }

    fn last(&self) -> &Coords {
        let leaves = self.leaves();
        &leaves[leaves.len() - 1].coords
    }

    fn into_leaves(self) -> Vec<ColorNode> {
        if self.children.is_empty() {
            vec![self]
        } else {
            self.children
        }
    }
}

/// How two chains are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    /// `a ++ b`
    Keep,
    /// `b ++ a`
    Swap,
    /// `rev(a) ++ b`
    ReverseFirst,
    /// `a ++ rev(b)`
    ReverseSecond,
}

/// Orders colors so that neighbors are close in `S`.
#[derive(Debug, Clone, Default)]
pub struct ClusterSorter<S> {
    space: S,
    config: ClusterConfig,
}

impl<S: ColorSpace> ClusterSorter<S> {
    #[must_use]
    pub fn new(space: S, config: ClusterConfig) -> Self {
        Self { space, config }
    }

    #[must_use]
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    #[must_use]
    pub fn space(&self) -> &S {
        &self.space
    }

    /// Reorder `entries`, returning the same entries as a permutation.
    #[must_use]
    pub fn sort<T: Clone>(&self, entries: &[T], color_of: impl Fn(&T) -> Color) -> Vec<T> {
        let colors: Vec<Color> = entries.iter().map(color_of).collect();
        self.order(&colors)
            .into_iter()
            .map(|id| entries[id].clone())
            .collect()
    }

    /// Positions of `colors` in sorted order.
    ///
    /// Fewer than two colors come back unchanged.
    #[must_use]
    pub fn order(&self, colors: &[Color]) -> Vec<usize> {
        match self.config.seed {
            Some(seed) => self.order_with_rng(colors, &mut SmallRng::seed_from_u64(seed)),
            None => self.order_with_rng(colors, &mut rand::rng()),
        }
    }

    /// Like [`order`](Self::order) with a caller-supplied shuffle source.
    pub fn order_with_rng<R: Rng + ?Sized>(&self, colors: &[Color], rng: &mut R) -> Vec<usize> {
        if colors.len() < 2 {
            return (0..colors.len()).collect();
        }
        let span = tracing::debug_span!(
            "cluster_sort",
            colors = colors.len(),
            merges = tracing::field::Empty
        );
        let _enter = span.enter();

        let mut nodes: Vec<ColorNode> = colors
            .iter()
            .enumerate()
            .map(|(id, &color)| ColorNode::leaf(id, self.space.coords(color)))
            .collect();
        nodes.shuffle(rng);

        let mut merges = 0usize;
        while nodes.len() > 1 {
            let (i, j) = self.closest_pair(&nodes);
            let b = nodes.remove(j);
            let a = nodes.remove(i);
            nodes.insert(i, self.merge(a, b));
            merges += 1;
        }
        span.record("merges", merges);

        nodes
            .pop()
            .map(ColorNode::into_leaves)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|leaf| leaf.color)
            .collect()
    }

    /// Shortest end-point distance between two chains.
    fn boundary_distance(&self, a: &ColorNode, b: &ColorNode) -> f64 {
        [a.first(), a.last()]
            .into_iter()
            .flat_map(|p| [b.first(), b.last()].map(|q| self.space.distance(p, q)))
            .fold(f64::INFINITY, f64::min)
    }

    /// Indices `i < j` of the closest pair.
    ///
    /// Ties on end-point distance fall back to centroid distance; remaining
    /// ties keep the first pair found.
    fn closest_pair(&self, nodes: &[ColorNode]) -> (usize, usize) {
        let mut best = (0, 1);
        let mut best_key = (f64::INFINITY, f64::INFINITY);
        for i in 0..nodes.len() {
            for j in i + 1..nodes.len() {
                let key = (
                    self.boundary_distance(&nodes[i], &nodes[j]),
                    self.space.distance(nodes[i].coords(), nodes[j].coords()),
                );
                let closer = match key.0.total_cmp(&best_key.0) {
                    Ordering::Less => true,
                    Ordering::Equal => key.1.total_cmp(&best_key.1) == Ordering::Less,
                    Ordering::Greater => false,
                };
                if closer {
                    best = (i, j);
                    best_key = key;
                }
            }
        }
        best
    }

    fn pick_join(&self, a: &ColorNode, b: &ColorNode) -> Join {
        let candidates = [
            (Join::Keep, self.space.distance(a.last(), b.first())),
            (Join::Swap, self.space.distance(b.last(), a.first())),
            (Join::ReverseFirst, self.space.distance(a.first(), b.first())),
            (Join::ReverseSecond, self.space.distance(a.last(), b.last())),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1.total_cmp(&best.1) == Ordering::Less {
                best = *candidate;
            }
        }
        best.0
    }

    fn merge(&self, a: ColorNode, b: ColorNode) -> ColorNode {
        let join = self.pick_join(&a, &b);
        let mut a = a.into_leaves();
        let mut b = b.into_leaves();
        let leaves = match join {
            Join::Keep => {
                a.append(&mut b);
                a
            }
            Join::Swap => {
                b.append(&mut a);
                b
            }
            Join::ReverseFirst => {
                a.reverse();
                a.append(&mut b);
                a
            }
            Join::ReverseSecond => {
                b.reverse();
                a.append(&mut b);
                a
            }
        };
        ColorNode::chain(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::RgbSpace;

    fn sorter(seed: u64) -> ClusterSorter<RgbSpace> {
        ClusterSorter::new(RgbSpace, ClusterConfig::seeded(seed))
    }

    fn adjacent(order: &[usize], x: usize, y: usize) -> bool {
        order.windows(2).any(|w| (w[0] == x && w[1] == y) || (w[0] == y && w[1] == x))
    }

    #[test]
    fn fewer_than_two_is_identity() {
        let s = sorter(1);
        assert!(s.order(&[]).is_empty());
        assert_eq!(s.order(&[Color::new(0x123456)]), vec![0]);
    }

    #[test]
    fn middle_color_sits_between() {
        let a = Color::from_rgb(0, 0, 0);
        let b = Color::from_rgb(1, 0, 0);
        let c = Color::from_rgb(10, 0, 0);
        for seed in 0..32 {
            let order = sorter(seed).order(&[a, b, c]);
            assert_eq!(order.len(), 3);
            assert_eq!(order[1], 1, "seed {seed}: {order:?}");
            assert!(adjacent(&order, 0, 1));
            assert!(adjacent(&order, 1, 2));
        }
    }

    #[test]
    fn collinear_grays_come_out_monotonic() {
        let grays: Vec<Color> = [0u8, 40, 80, 120, 160, 200, 240]
            .iter()
            .map(|&v| Color::from_rgb(v, v, v))
            .collect();
        for seed in 0..16 {
            let order = sorter(seed).order(&grays);
            let ascending = order.windows(2).all(|w| w[0] < w[1]);
            let descending = order.windows(2).all(|w| w[0] > w[1]);
            assert!(ascending || descending, "seed {seed}: {order:?}");
        }
    }

    #[test]
    fn seeded_runs_repeat() {
        let colors: Vec<Color> = (0..24u32).map(|i| Color::new(i.wrapping_mul(0x9e3779))).collect();
        assert_eq!(sorter(7).order(&colors), sorter(7).order(&colors));
    }

    #[test]
    fn sort_keeps_entries() {
        let entries = vec![
            (Color::from_rgb(200, 0, 0), "red"),
            (Color::from_rgb(0, 0, 200), "blue"),
            (Color::from_rgb(190, 10, 0), "red-ish"),
        ];
        let sorted = sorter(3).sort(&entries, |e| e.0);
        assert_eq!(sorted.len(), 3);
        let names: Vec<&str> = sorted.iter().map(|e| e.1).collect();
        let red = names.iter().position(|n| *n == "red").unwrap_or(usize::MAX);
        let reddish = names.iter().position(|n| *n == "red-ish").unwrap_or(usize::MAX);
        assert_eq!(red.abs_diff(reddish), 1);
    }

    #[test]
    fn pick_join_prefers_shortest_junction() {
        let s = sorter(0);
        let a = ColorNode::chain(vec![
            ColorNode::leaf(0, [0.0, 0.0, 0.0]),
            ColorNode::leaf(1, [10.0, 0.0, 0.0]),
        ]);
        let b = ColorNode::chain(vec![
            ColorNode::leaf(2, [11.0, 0.0, 0.0]),
            ColorNode::leaf(3, [20.0, 0.0, 0.0]),
        ]);
        assert_eq!(s.pick_join(&a, &b), Join::Keep);
        assert_eq!(s.pick_join(&b, &a), Join::Swap);

        let reversed = ColorNode::chain(vec![
            ColorNode::leaf(3, [20.0, 0.0, 0.0]),
            ColorNode::leaf(2, [11.0, 0.0, 0.0]),
        ]);
        assert_eq!(s.pick_join(&a, &reversed), Join::ReverseSecond);
        let merged = s.merge(a, reversed);
        let ids: Vec<Option<usize>> = merged.leaves().iter().map(ColorNode::color).collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(merged.coords(), &[10.25, 0.0, 0.0]);
    }
}
