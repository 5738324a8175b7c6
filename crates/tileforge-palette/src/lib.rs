#![forbid(unsafe_code)]

//! Tile palettes and perceptual color ordering.
//!
//! - [`Color`] / [`ColorData`]: packed RGB plus per-palette usage counts.
//! - [`Palette`]: sixteen addressable slots and an overflow list, with the
//!   bookkeeping helpers commands use to rebuild palettes from tile pixels.
//! - [`ClusterSorter`]: greedy agglomerative ordering over any
//!   [`ColorSpace`], and [`sorted_palette`] which applies it to a palette.
//!
//! # Example
//!
//! ```
//! use tileforge_palette::{ClusterConfig, ClusterSorter, Color, RgbSpace};
//!
//! let a = Color::from_rgb(0, 0, 0);
//! let b = Color::from_rgb(1, 0, 0);
//! let c = Color::from_rgb(10, 0, 0);
//!
//! let sorter = ClusterSorter::new(RgbSpace, ClusterConfig::seeded(1));
//! let order = sorter.order(&[a, b, c]);
//! assert_eq!(order[1], 1);
//! ```

pub mod cluster;
pub mod color;
pub mod error;
pub mod palette;
pub mod sort;
pub mod space;

pub use cluster::{ClusterConfig, ClusterSorter, ColorNode};
pub use color::{Color, ColorData, EMPTY_COLOR};
pub use error::PaletteError;
pub use palette::{PALETTE_SIZE, Palette, with_item_first};
pub use sort::sorted_palette;
pub use space::{ColorSpace, Coords, RgbSpace, distance_squared};
