#![forbid(unsafe_code)]

//! Color spaces used for ordering.
//!
//! Perceptual conversion lives with the host; the sorter only needs a point
//! per color and a symmetric, non-negative distance between points.

use crate::color::Color;

/// A point in some three-component color space.
pub type Coords = [f64; 3];

/// Maps colors to points and measures distance between points.
pub trait ColorSpace {
    /// Position of `color` in this space.
    fn coords(&self, color: Color) -> Coords;

    /// Distance between two points. Defaults to squared Euclidean.
    fn distance(&self, a: &Coords, b: &Coords) -> f64 {
        distance_squared(a, b)
    }
}

/// Plain sRGB components, 0 to 255.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbSpace;

impl ColorSpace for RgbSpace {
    fn coords(&self, color: Color) -> Coords {
        let (r, g, b) = color.rgb();
        [f64::from(r), f64::from(g), f64::from(b)]
    }
}

impl<S: ColorSpace + ?Sized> ColorSpace for &S {
    fn coords(&self, color: Color) -> Coords {
        (**self).coords(color)
    }

    fn distance(&self, a: &Coords, b: &Coords) -> f64 {
        (**self).distance(a, b)
    }
}

/// Squared Euclidean distance.
#[must_use]
pub fn distance_squared(a: &Coords, b: &Coords) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Arithmetic mean of a non-empty set of points.
pub(crate) fn centroid<'a>(points: impl IntoIterator<Item = &'a Coords>) -> Coords {
    let mut sum = [0.0; 3];
    let mut n = 0usize;
    for p in points {
        for (acc, v) in sum.iter_mut().zip(p) {
            *acc += v;
        }
        n += 1;
    }
    if n > 0 {
        let n = n as f64;
        for acc in &mut sum {
            *acc /= n;
        }
    }
    sum
}
