#![forbid(unsafe_code)]

//! Tile diffs.
//!
//! Each builder describes a rewrite of the tile list as a
//! [`TrackedPatch`] between the current tiles and the rewritten ones. The
//! patch holds only the tiles that change, so it doubles as compact undo
//! data once applied.

use tileforge_diff::TrackedPatch;

use crate::document::{Tile, TilesetDocument};

fn rewrite(tiles: &[Tile], f: impl Fn(Tile) -> Tile) -> TrackedPatch<Tile> {
    let rewritten: Vec<Tile> = tiles.iter().copied().map(f).collect();
    TrackedPatch::between(tiles, &rewritten)
}

/// Move every selected tile into `palette_index`.
#[must_use]
pub fn assign_selected(doc: &TilesetDocument, palette_index: usize) -> TrackedPatch<Tile> {
    rewrite(&doc.tiles, |tile| {
        if tile.selected {
            Tile {
                palette_index: Some(palette_index),
                ..tile
            }
        } else {
            tile
        }
    })
}

/// Unassign the selected tiles of `palette_index`.
#[must_use]
pub fn unassign_selected(doc: &TilesetDocument, palette_index: usize) -> TrackedPatch<Tile> {
    rewrite(&doc.tiles, |tile| {
        if tile.selected && tile.palette_index == Some(palette_index) {
            Tile {
                palette_index: None,
                ..tile
            }
        } else {
            tile
        }
    })
}

/// Unassign the tiles of `palette_index` and renumber tiles of later
/// palettes down by one, matching the palette list after removal.
#[must_use]
pub fn remove_palette(doc: &TilesetDocument, palette_index: usize) -> TrackedPatch<Tile> {
    rewrite(&doc.tiles, |tile| match tile.palette_index {
        Some(index) if index == palette_index => Tile {
            palette_index: None,
            ..tile
        },
        Some(index) if index > palette_index => Tile {
            palette_index: Some(index - 1),
            ..tile
        },
        _ => tile,
    })
}

/// Replace the selection with the tiles matching `predicate`.
#[must_use]
pub fn select_where(
    doc: &TilesetDocument,
    predicate: impl Fn(&Tile) -> bool,
) -> TrackedPatch<Tile> {
    rewrite(&doc.tiles, |tile| Tile {
        selected: predicate(&tile),
        ..tile
    })
}
