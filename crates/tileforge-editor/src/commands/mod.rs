#![forbid(unsafe_code)]

//! Command namespaces over [`TilesetDocument`].
//!
//! | Namespace  | Verbs                                                                    |
//! |------------|--------------------------------------------------------------------------|
//! | `palettes` | `add`, `addTiles`, `removeTiles`, `delete`, `setTransparencyColor`, `sort` |
//! | `tiles`    | `selectByPaletteColors`                                                  |
//! | `image`    | `mergeColors`                                                            |
//!
//! Every handler validates its input before touching the document, so a
//! failed execute leaves it unchanged.

pub mod image;
pub mod palettes;
pub mod tiles;

use im::Vector;

use tileforge_diff::TrackedPatch;
use tileforge_palette::{Color, Palette};
use tileforge_runtime::CommandError;

use crate::document::{Tile, TilesetDocument};

fn missing_palette(index: usize) -> CommandError {
    CommandError::handler(format!("no palette with index {index}"))
}

/// Position of palette `index`, or a handler error naming it.
pub(crate) fn palette_position(doc: &TilesetDocument, index: usize) -> Result<usize, CommandError> {
    doc.palette_position(index).ok_or_else(|| missing_palette(index))
}

/// Palette `index` and its position.
pub(crate) fn find_palette(
    doc: &TilesetDocument,
    index: usize,
) -> Result<(usize, &Palette), CommandError> {
    doc.palettes
        .iter()
        .enumerate()
        .find(|(_, palette)| palette.index == index)
        .ok_or_else(|| missing_palette(index))
}

/// Apply a freshly built tile patch and hand it back as undo data.
pub(crate) fn apply_tiles(
    doc: &mut TilesetDocument,
    mut patch: TrackedPatch<Tile>,
) -> Result<TrackedPatch<Tile>, CommandError> {
    patch.apply_to(&mut doc.tiles)?;
    Ok(patch)
}

/// Recount the palettes numbered `indices` from their tiles.
pub(crate) fn recount(doc: &mut TilesetDocument, indices: impl IntoIterator<Item = usize>) {
    for index in indices {
        let Some(position) = doc.palette_position(index) else {
            continue;
        };
        let Some(updated) = doc.palettes.get(position).map(|p| doc.recounted(p)) else {
            continue;
        };
        doc.palettes.set(position, updated);
    }
}

/// Undo data for commands that rewrite palettes.
///
/// The palette list is captured whole; with [`im::Vector`] that is a cheap
/// structural clone.
#[derive(Debug)]
pub struct PaletteSnapshot {
    palettes: Vector<Palette>,
    transparency_color: Color,
    tiles: Option<TrackedPatch<Tile>>,
}

impl PaletteSnapshot {
    pub(crate) fn of(doc: &TilesetDocument) -> Self {
        Self {
            palettes: doc.palettes.clone(),
            transparency_color: doc.transparency_color,
            tiles: None,
        }
    }

    #[must_use]
    pub(crate) fn with_tiles(mut self, tiles: TrackedPatch<Tile>) -> Self {
        self.tiles = Some(tiles);
        self
    }

    /// Palettes as they were before the command ran.
    #[must_use]
    pub fn palettes(&self) -> &Vector<Palette> {
        &self.palettes
    }

    /// Put the document back. Tiles are reverted first so a drifted patch
    /// fails before anything changes.
    pub(crate) fn restore(&self, doc: &mut TilesetDocument) -> Result<(), CommandError> {
        if let Some(tiles) = &self.tiles {
            tiles.undo_on(&mut doc.tiles)?;
        }
        doc.palettes = self.palettes.clone();
        doc.transparency_color = self.transparency_color;
        Ok(())
    }
}
