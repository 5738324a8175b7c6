#![forbid(unsafe_code)]

//! The `tiles` namespace: selection by palette coverage.
//!
//! A tile is covered by a color set when it has at least one opaque pixel
//! and every opaque pixel's color is in the set. Transparent pixels never
//! count against a tile.
//!
//! With `num_extra > 0` the set is first widened: every tile that misses
//! between one and `num_extra` colors proposes its missing colors as a
//! candidate extension, and the candidate that completes the most tiles
//! wins (fewest colors, then lowest colors, on ties). The palette itself is
//! not modified; only the selection changes.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use tileforge_diff::TrackedPatch;
use tileforge_palette::Color;
use tileforge_runtime::{CommandError, CommandHandler, Namespace};

use super::{apply_tiles, find_palette};
use crate::document::{Tile, TilesetDocument};
use crate::tiles;

pub const NAMESPACE: &str = "tiles";

/// Select every tile a palette can draw, optionally allowing extra colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectByPaletteColors {
    pub palette_index: usize,
    /// How many colors the palette may be imagined to gain.
    #[serde(default)]
    pub num_extra: usize,
}

/// Opaque colors of a tile that are not in `included`, sorted and deduped.
fn missing_colors(pixels: &[Color], included: &AHashSet<Color>, transparency: Color) -> Vec<Color> {
    let mut missing: Vec<Color> = pixels
        .iter()
        .copied()
        .filter(|c| *c != transparency && !included.contains(c))
        .collect();
    missing.sort_unstable();
    missing.dedup();
    missing
}

fn has_opaque_pixel(pixels: &[Color], transparency: Color) -> bool {
    pixels.iter().any(|&c| c != transparency)
}

/// The extension of at most `num_extra` colors completing the most tiles.
fn best_extension(
    doc: &TilesetDocument,
    included: &AHashSet<Color>,
    num_extra: usize,
) -> Vec<Color> {
    let transparency = doc.transparency_color;
    let mut demand: AHashMap<Vec<Color>, usize> = AHashMap::new();
    for tile in &doc.tiles {
        let missing = missing_colors(doc.tile_pixels(tile.tile_index), included, transparency);
        if !missing.is_empty() && missing.len() <= num_extra {
            *demand.entry(missing).or_insert(0) += 1;
        }
    }

    let mut best: Option<(usize, &Vec<Color>)> = None;
    for candidate in demand.keys() {
        let completed: usize = demand
            .iter()
            .filter(|(need, _)| need.iter().all(|c| candidate.binary_search(c).is_ok()))
            .map(|(_, count)| count)
            .sum();
        let better = match best {
            None => true,
            Some((score, current)) => {
                completed > score
                    || (completed == score
                        && (candidate.len(), candidate) < (current.len(), current))
            }
        };
        if better {
            best = Some((completed, candidate));
        }
    }
    best.map(|(_, colors)| colors.clone()).unwrap_or_default()
}

/// Tile diff selecting exactly the tiles covered by palette `palette_index`.
///
/// # Errors
///
/// A handler error if the palette does not exist.
pub fn selection_diff(
    doc: &TilesetDocument,
    palette_index: usize,
    num_extra: usize,
) -> Result<TrackedPatch<Tile>, CommandError> {
    let (_, palette) = find_palette(doc, palette_index)?;
    let mut included: AHashSet<Color> = if num_extra == 0 {
        palette.colors.iter().map(|entry| entry.color).collect()
    } else {
        palette.entries().map(|entry| entry.color).collect()
    };
    if num_extra > 0 {
        let extension = best_extension(doc, &included, num_extra);
        tracing::debug!(palette = palette_index, extension = ?extension, "widened palette for selection");
        included.extend(extension);
    }

    let transparency = doc.transparency_color;
    Ok(tiles::select_where(doc, |tile| {
        let pixels = doc.tile_pixels(tile.tile_index);
        has_opaque_pixel(pixels, transparency)
            && missing_colors(pixels, &included, transparency).is_empty()
    }))
}

struct SelectByPaletteColorsHandler;

impl CommandHandler<TilesetDocument> for SelectByPaletteColorsHandler {
    type Payload = SelectByPaletteColors;
    type Output = TrackedPatch<Tile>;

    fn describe(&self, _: &SelectByPaletteColors) -> String {
        String::from("Selected Tiles by Palette Colors")
    }

    fn execute(
        &self,
        doc: &mut TilesetDocument,
        payload: &SelectByPaletteColors,
    ) -> Result<TrackedPatch<Tile>, CommandError> {
        let patch = selection_diff(doc, payload.palette_index, payload.num_extra)?;
        apply_tiles(doc, patch)
    }

    fn undo(
        &self,
        doc: &mut TilesetDocument,
        patch: &TrackedPatch<Tile>,
        _: &SelectByPaletteColors,
    ) -> Result<(), CommandError> {
        patch.undo_on(&mut doc.tiles)?;
        Ok(())
    }
}

/// The `tiles` namespace.
#[must_use]
pub fn namespace() -> Namespace<TilesetDocument> {
    Namespace::new(NAMESPACE).verb("selectByPaletteColors", SelectByPaletteColorsHandler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TilePixels;
    use tileforge_palette::Palette;
    use tileforge_runtime::{Command, CommandHistory, HistoryConfig};

    const T: Color = Color::MAGENTA;
    const R: Color = Color::new(0xff0000);
    const G: Color = Color::new(0x00ff00);
    const B: Color = Color::new(0x0000ff);
    const W: Color = Color::new(0xffffff);

    /// Tiles: [R,T] [R,G] [T,T] [B,T] [B,W] [G,G]; palette 0 = {T, R, G}.
    fn history() -> CommandHistory<TilesetDocument> {
        let pixels =
            TilePixels::from_tiles(2, [[R, T], [R, G], [T, T], [B, T], [B, W], [G, G]]).unwrap();
        let mut doc = TilesetDocument::new(pixels);
        doc.tiles[0].palette_index = Some(0);
        doc.tiles[1].palette_index = Some(0);
        let palette = doc.recounted(&Palette::new(0));
        doc.palettes.push_back(palette);
        doc.tiles[3].selected = true;

        let mut history = CommandHistory::new(doc, HistoryConfig::default());
        history.register_namespace(&namespace());
        history
    }

    fn selected(doc: &TilesetDocument) -> Vec<usize> {
        doc.selected_tiles().map(|t| t.tile_index).collect()
    }

    fn select(history: &mut CommandHistory<TilesetDocument>, num_extra: usize) {
        history
            .execute_command(Command::new(
                "tiles.selectByPaletteColors",
                SelectByPaletteColors {
                    palette_index: 0,
                    num_extra,
                },
            ))
            .unwrap();
    }

    #[test]
    fn covered_tiles_replace_selection() {
        let mut h = history();
        select(&mut h, 0);
        // Fully transparent tile 2 is never selected.
        assert_eq!(selected(h.document()), vec![0, 1, 5]);

        h.undo().unwrap();
        assert_eq!(selected(h.document()), vec![3]);
    }

    #[test]
    fn one_extra_color_picks_most_completed_tiles() {
        let mut h = history();
        select(&mut h, 1);
        // {B} completes tile 3; {W} is not a candidate on its own.
        assert_eq!(selected(h.document()), vec![0, 1, 3, 5]);
        assert!(!h.document().palette(0).unwrap().contains(B));
    }

    #[test]
    fn two_extra_colors_prefer_the_wider_win() {
        let mut h = history();
        select(&mut h, 2);
        // {B, W} completes tiles 3 and 4; {B} alone only tile 3.
        assert_eq!(selected(h.document()), vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn ties_prefer_fewer_then_lower_colors() {
        let included: AHashSet<Color> = [T].into_iter().collect();
        let pixels = TilePixels::from_tiles(1, [[G], [R], [W]]).unwrap();
        let doc = TilesetDocument::new(pixels);
        assert_eq!(best_extension(&doc, &included, 1), vec![G]);
    }

    #[test]
    fn unknown_palette_is_rejected() {
        let h = history();
        assert!(selection_diff(h.document(), 9, 0).is_err());
    }
}
