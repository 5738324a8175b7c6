#![forbid(unsafe_code)]

//! The tileset document every editor command mutates.
//!
//! A [`TilesetDocument`] is a grid of fixed-size tiles cut from one bitmap.
//! Decoding the bitmap is the host's job: it hands over the pixels already
//! grouped tile by tile as [`TilePixels`]. Each [`Tile`] may belong to one
//! [`Palette`] and may be selected.
//!
//! Palettes live in an [`im::Vector`], so capturing them for undo is a
//! constant-time clone that shares structure with the live list.

use im::Vector;
use serde::{Deserialize, Serialize};

use tileforge_palette::{Color, Palette};

use crate::error::EditorError;

/// One tile of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Position of the tile's pixels in [`TilePixels`].
    pub tile_index: usize,
    /// Palette the tile is drawn with, if any.
    pub palette_index: Option<usize>,
    pub selected: bool,
}

impl Tile {
    /// An unassigned, unselected tile.
    #[must_use]
    pub const fn new(tile_index: usize) -> Self {
        Self {
            tile_index,
            palette_index: None,
            selected: false,
        }
    }
}

// ============================================================================
// Pixels
// ============================================================================

/// Tile-major pixel storage: `tile_area` consecutive pixels per tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePixels {
    tile_area: usize,
    pixels: Vec<Color>,
}

impl TilePixels {
    /// Wrap a flat buffer.
    ///
    /// # Errors
    ///
    /// [`EditorError::PixelLayout`] if `tile_area` is zero or does not divide
    /// the buffer length.
    pub fn new(tile_area: usize, pixels: Vec<Color>) -> Result<Self, EditorError> {
        if tile_area == 0 || pixels.len() % tile_area != 0 {
            return Err(EditorError::PixelLayout {
                len: pixels.len(),
                tile_area,
            });
        }
        Ok(Self { tile_area, pixels })
    }

    /// Concatenate per-tile pixel runs.
    ///
    /// # Errors
    ///
    /// [`EditorError::PixelLayout`] if any run is not `tile_area` long.
    pub fn from_tiles<I, T>(tile_area: usize, tiles: I) -> Result<Self, EditorError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[Color]>,
    {
        let mut pixels = Vec::new();
        for tile in tiles {
            let tile = tile.as_ref();
            if tile.len() != tile_area {
                return Err(EditorError::PixelLayout {
                    len: tile.len(),
                    tile_area,
                });
            }
            pixels.extend_from_slice(tile);
        }
        Self::new(tile_area, pixels)
    }

    #[must_use]
    pub fn tile_area(&self) -> usize {
        self.tile_area
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.pixels.len().checked_div(self.tile_area).unwrap_or(0)
    }

    /// Pixels of one tile; empty if the tile does not exist.
    #[must_use]
    pub fn tile(&self, tile_index: usize) -> &[Color] {
        let Some(start) = tile_index.checked_mul(self.tile_area) else {
            return &[];
        };
        let end = start.saturating_add(self.tile_area);
        self.pixels.get(start..end).unwrap_or(&[])
    }

    /// The whole buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[Color] {
        &self.pixels
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<Color> {
        &mut self.pixels
    }
}

// ============================================================================
// Document
// ============================================================================

/// Tiles, their palettes and the pixels behind them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesetDocument {
    pub tiles: Vec<Tile>,
    pub palettes: Vector<Palette>,
    /// Index given to the first palette. Palette `i` sits at position
    /// `i - palette_index_offset` while no palette has been deleted.
    pub palette_index_offset: usize,
    /// Pixels of this color are transparent and never count as palette
    /// colors.
    pub transparency_color: Color,
    pub pixels: TilePixels,
}

impl TilesetDocument {
    /// One unassigned tile per pixel run, magenta transparency, no palettes.
    #[must_use]
    pub fn new(pixels: TilePixels) -> Self {
        Self {
            tiles: (0..pixels.tile_count()).map(Tile::new).collect(),
            palettes: Vector::new(),
            palette_index_offset: 0,
            transparency_color: Color::MAGENTA,
            pixels,
        }
    }

    #[must_use]
    pub fn with_transparency(mut self, color: Color) -> Self {
        self.transparency_color = color;
        self
    }

    #[must_use]
    pub fn with_palette_index_offset(mut self, offset: usize) -> Self {
        self.palette_index_offset = offset;
        self
    }

    #[must_use]
    pub fn tile_pixels(&self, tile_index: usize) -> &[Color] {
        self.pixels.tile(tile_index)
    }

    /// Tiles drawn with `palette_index`; `None` yields unassigned tiles.
    pub fn tiles_in_palette(&self, palette_index: Option<usize>) -> impl Iterator<Item = &Tile> {
        self.tiles
            .iter()
            .filter(move |tile| tile.palette_index == palette_index)
    }

    pub fn selected_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|tile| tile.selected)
    }

    /// Set the selection flag of one tile. Returns `false` if there is no
    /// such tile.
    ///
    /// Selection made this way is not recorded in history.
    pub fn select_tile(&mut self, tile_index: usize, selected: bool) -> bool {
        match self.tiles.iter_mut().find(|tile| tile.tile_index == tile_index) {
            Some(tile) => {
                tile.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        for tile in &mut self.tiles {
            tile.selected = false;
        }
    }

    /// Position in `palettes` of the palette numbered `index`.
    #[must_use]
    pub fn palette_position(&self, index: usize) -> Option<usize> {
        self.palettes.iter().position(|palette| palette.index == index)
    }

    #[must_use]
    pub fn palette(&self, index: usize) -> Option<&Palette> {
        self.palette_position(index)
            .and_then(|position| self.palettes.get(position))
    }

    /// Index a newly added palette receives.
    #[must_use]
    pub fn next_palette_index(&self) -> usize {
        self.palettes.len() + self.palette_index_offset
    }

    /// `palette` with usage counts recomputed from the tiles drawn with it.
    #[must_use]
    pub fn recounted(&self, palette: &Palette) -> Palette {
        palette.updated_from_tiles(
            self.tiles_in_palette(Some(palette.index))
                .map(|tile| self.pixels.tile(tile.tile_index)),
            self.transparency_color,
        )
    }
}
