#![forbid(unsafe_code)]

//! The `palettes` namespace.
//!
//! Tile membership changes go through tile diffs; every palette whose
//! membership changed is then recounted from its tiles' pixels. Undo puts
//! back the captured palette list and reverts the tile diff.

use serde::{Deserialize, Serialize};

use tileforge_palette::{ClusterSorter, Color, ColorSpace, Palette, sorted_palette};
use tileforge_runtime::{CommandError, CommandHandler, Namespace};

use super::{PaletteSnapshot, apply_tiles, find_palette, palette_position, recount};
use crate::document::TilesetDocument;
use crate::tiles;

pub const NAMESPACE: &str = "palettes";

// ============================================================================
// Payloads
// ============================================================================

/// Create a palette from the selected tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddPalette;

/// Move the selected tiles into a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTiles {
    pub palette_index: usize,
}

/// Unassign the selected tiles of a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveTiles {
    pub palette_index: usize,
}

/// Delete a palette; later palettes are renumbered down by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePalette {
    pub palette_index: usize,
}

/// Change the document's transparency color and re-pin it in every palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTransparencyColor {
    pub color: Color,
}

/// Reorder a palette by color similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortPalette {
    pub palette_index: usize,
}

// ============================================================================
// Handlers
// ============================================================================

struct AddPaletteHandler;

impl CommandHandler<TilesetDocument> for AddPaletteHandler {
    type Payload = AddPalette;
    type Output = PaletteSnapshot;

    fn describe(&self, _: &AddPalette) -> String {
        String::from("Added Palette")
    }

    fn execute(
        &self,
        doc: &mut TilesetDocument,
        _: &AddPalette,
    ) -> Result<PaletteSnapshot, CommandError> {
        let snapshot = PaletteSnapshot::of(doc);
        let index = doc.next_palette_index();
        let previous: Vec<usize> = doc.selected_tiles().filter_map(|t| t.palette_index).collect();

        let patch = tiles::assign_selected(doc, index);
        let tiles = apply_tiles(doc, patch)?;
        doc.palettes.push_back(Palette::new(index));
        recount(doc, previous.into_iter().chain([index]));
        tracing::debug!(palette = index, "added palette");
        Ok(snapshot.with_tiles(tiles))
    }

    fn undo(
        &self,
        doc: &mut TilesetDocument,
        snapshot: &PaletteSnapshot,
        _: &AddPalette,
    ) -> Result<(), CommandError> {
        snapshot.restore(doc)
    }
}

struct AddTilesHandler;

impl CommandHandler<TilesetDocument> for AddTilesHandler {
    type Payload = AddTiles;
    type Output = PaletteSnapshot;

    fn describe(&self, _: &AddTiles) -> String {
        String::from("Added Tiles to Palette")
    }

    fn execute(
        &self,
        doc: &mut TilesetDocument,
        payload: &AddTiles,
    ) -> Result<PaletteSnapshot, CommandError> {
        let index = payload.palette_index;
        palette_position(doc, index)?;
        let snapshot = PaletteSnapshot::of(doc);
        let previous: Vec<usize> = doc
            .selected_tiles()
            .filter_map(|t| t.palette_index)
            .filter(|&p| p != index)
            .collect();

        let patch = tiles::assign_selected(doc, index);
        let tiles = apply_tiles(doc, patch)?;
        recount(doc, previous.into_iter().chain([index]));
        Ok(snapshot.with_tiles(tiles))
    }

    fn undo(
        &self,
        doc: &mut TilesetDocument,
        snapshot: &PaletteSnapshot,
        _: &AddTiles,
    ) -> Result<(), CommandError> {
        snapshot.restore(doc)
    }
}

struct RemoveTilesHandler;

impl CommandHandler<TilesetDocument> for RemoveTilesHandler {
    type Payload = RemoveTiles;
    type Output = PaletteSnapshot;

    fn describe(&self, _: &RemoveTiles) -> String {
        String::from("Removed Tiles from Palette")
    }

    fn execute(
        &self,
        doc: &mut TilesetDocument,
        payload: &RemoveTiles,
    ) -> Result<PaletteSnapshot, CommandError> {
        let index = payload.palette_index;
        palette_position(doc, index)?;
        let snapshot = PaletteSnapshot::of(doc);
        let patch = tiles::unassign_selected(doc, index);
        let tiles = apply_tiles(doc, patch)?;
        recount(doc, [index]);
        Ok(snapshot.with_tiles(tiles))
    }

    fn undo(
        &self,
        doc: &mut TilesetDocument,
        snapshot: &PaletteSnapshot,
        _: &RemoveTiles,
    ) -> Result<(), CommandError> {
        snapshot.restore(doc)
    }
}

struct DeletePaletteHandler;

impl CommandHandler<TilesetDocument> for DeletePaletteHandler {
    type Payload = DeletePalette;
    type Output = PaletteSnapshot;

    fn describe(&self, _: &DeletePalette) -> String {
        String::from("Deleted Palette")
    }

    fn execute(
        &self,
        doc: &mut TilesetDocument,
        payload: &DeletePalette,
    ) -> Result<PaletteSnapshot, CommandError> {
        let index = payload.palette_index;
        let position = palette_position(doc, index)?;
        let snapshot = PaletteSnapshot::of(doc);

        let patch = tiles::remove_palette(doc, index);
        let tiles = apply_tiles(doc, patch)?;
        doc.palettes.remove(position);
        for palette in doc.palettes.iter_mut().filter(|p| p.index > index) {
            palette.index -= 1;
        }
        tracing::debug!(palette = index, remaining = doc.palettes.len(), "deleted palette");
        Ok(snapshot.with_tiles(tiles))
    }

    fn undo(
        &self,
        doc: &mut TilesetDocument,
        snapshot: &PaletteSnapshot,
        _: &DeletePalette,
    ) -> Result<(), CommandError> {
        snapshot.restore(doc)
    }
}

struct SetTransparencyColorHandler;

impl CommandHandler<TilesetDocument> for SetTransparencyColorHandler {
    type Payload = SetTransparencyColor;
    type Output = PaletteSnapshot;

    fn describe(&self, _: &SetTransparencyColor) -> String {
        String::from("Set Transparency Color")
    }

    fn execute(
        &self,
        doc: &mut TilesetDocument,
        payload: &SetTransparencyColor,
    ) -> Result<PaletteSnapshot, CommandError> {
        let snapshot = PaletteSnapshot::of(doc);
        doc.palettes = doc
            .palettes
            .iter()
            .map(|palette| palette.with_transparency(payload.color))
            .collect();
        doc.transparency_color = payload.color;
        Ok(snapshot)
    }

    fn undo(
        &self,
        doc: &mut TilesetDocument,
        snapshot: &PaletteSnapshot,
        _: &SetTransparencyColor,
    ) -> Result<(), CommandError> {
        snapshot.restore(doc)
    }
}

struct SortPaletteHandler<S> {
    sorter: ClusterSorter<S>,
}

impl<S: ColorSpace + 'static> CommandHandler<TilesetDocument> for SortPaletteHandler<S> {
    type Payload = SortPalette;
    type Output = PaletteSnapshot;

    fn describe(&self, _: &SortPalette) -> String {
        String::from("Sorted Palette")
    }

    fn execute(
        &self,
        doc: &mut TilesetDocument,
        payload: &SortPalette,
    ) -> Result<PaletteSnapshot, CommandError> {
        let (position, palette) = find_palette(doc, payload.palette_index)?;
        let sorted = sorted_palette(palette, &self.sorter)?;
        let snapshot = PaletteSnapshot::of(doc);
        doc.palettes.set(position, sorted);
        Ok(snapshot)
    }

    fn undo(
        &self,
        doc: &mut TilesetDocument,
        snapshot: &PaletteSnapshot,
        _: &SortPalette,
    ) -> Result<(), CommandError> {
        snapshot.restore(doc)
    }
}

/// The `palettes` namespace. `sort` orders colors with `sorter`.
#[must_use]
pub fn namespace<S: ColorSpace + 'static>(sorter: ClusterSorter<S>) -> Namespace<TilesetDocument> {
    Namespace::new(NAMESPACE)
        .verb("add", AddPaletteHandler)
        .verb("addTiles", AddTilesHandler)
        .verb("removeTiles", RemoveTilesHandler)
        .verb("delete", DeletePaletteHandler)
        .verb("setTransparencyColor", SetTransparencyColorHandler)
        .verb("sort", SortPaletteHandler { sorter })
}
