#![forbid(unsafe_code)]

//! The `image` namespace: pixel edits.

use im::Vector;
use serde::{Deserialize, Serialize};

use tileforge_diff::TrackedPatch;
use tileforge_palette::{Color, ColorData, EMPTY_COLOR, Palette};
use tileforge_runtime::{CommandError, CommandHandler, Namespace};

use super::find_palette;
use crate::document::TilesetDocument;

pub const NAMESPACE: &str = "image";

/// Repaint two colors of a palette's tiles as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeColors {
    pub color1: Color,
    pub color2: Color,
    pub target: Color,
    pub palette_index: usize,
}

/// Undo data for [`MergeColors`].
#[derive(Debug)]
pub struct MergeUndo {
    pixels: TrackedPatch<Color>,
    palettes: Vector<Palette>,
}

impl MergeUndo {
    /// Pixel edits made by the merge.
    #[must_use]
    pub fn pixels(&self) -> &TrackedPatch<Color> {
        &self.pixels
    }
}

/// `palette` with the entries for `a` and `b` folded into one `target`
/// entry at the earlier slot.
fn merged_palette(
    palette: &Palette,
    a: Color,
    b: Color,
    target: Color,
) -> Result<Palette, CommandError> {
    let mut entries = palette.all_colors();
    let mut positions: Vec<usize> = [a, b]
        .iter()
        .filter_map(|&color| entries.iter().position(|entry| entry.color == color))
        .collect();
    positions.sort_unstable();
    positions.dedup();
    let Some((&first, rest)) = positions.split_first() else {
        return Err(CommandError::handler(format!(
            "palette {} has neither {a} nor {b}",
            palette.index
        )));
    };

    let usage_count: u32 = positions.iter().map(|&at| entries[at].usage_count).sum();
    entries[first] = ColorData::new(target, usage_count);
    for &at in rest {
        entries[at] = EMPTY_COLOR;
    }
    Ok(Palette::from_entries(palette.index, entries).without_excess_empty_colors(Color::BLACK))
}

struct MergeColorsHandler;

impl CommandHandler<TilesetDocument> for MergeColorsHandler {
    type Payload = MergeColors;
    type Output = MergeUndo;

    fn describe(&self, _: &MergeColors) -> String {
        String::from("Merge Colors")
    }

    fn execute(
        &self,
        doc: &mut TilesetDocument,
        payload: &MergeColors,
    ) -> Result<MergeUndo, CommandError> {
        let (position, palette) = find_palette(doc, payload.palette_index)?;
        let merged = merged_palette(palette, payload.color1, payload.color2, payload.target)?;

        let mut recolored = doc.pixels.as_slice().to_vec();
        let tile_area = doc.pixels.tile_area();
        for tile in doc.tiles_in_palette(Some(payload.palette_index)) {
            let start = tile.tile_index * tile_area;
            let Some(pixels) = recolored.get_mut(start..start + tile_area) else {
                continue;
            };
            for pixel in pixels {
                if *pixel == payload.color1 || *pixel == payload.color2 {
                    *pixel = payload.target;
                }
            }
        }
        let mut patch = TrackedPatch::between(doc.pixels.as_slice(), &recolored);

        patch.apply_to(doc.pixels.buffer_mut())?;
        let palettes = doc.palettes.clone();
        doc.palettes.set(position, merged);
        tracing::debug!(
            palette = payload.palette_index,
            pixels = patch.len(),
            "merged colors"
        );
        Ok(MergeUndo { pixels: patch, palettes })
    }

    fn undo(
        &self,
        doc: &mut TilesetDocument,
        undo: &MergeUndo,
        _: &MergeColors,
    ) -> Result<(), CommandError> {
        undo.pixels.undo_on(doc.pixels.buffer_mut())?;
        doc.palettes = undo.palettes.clone();
        Ok(())
    }
}

/// The `image` namespace.
#[must_use]
pub fn namespace() -> Namespace<TilesetDocument> {
    Namespace::new(NAMESPACE).verb("mergeColors", MergeColorsHandler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TilePixels;
    use tileforge_runtime::{Command, CommandHistory, HistoryConfig};

    const T: Color = Color::MAGENTA;
    const R: Color = Color::new(0xff0000);
    const DARK_R: Color = Color::new(0xee0000);
    const G: Color = Color::new(0x00ff00);

    /// Tiles [R,DARK_R] [G,T] in palette 0, tile [R,R] unassigned.
    fn history() -> CommandHistory<TilesetDocument> {
        let pixels = TilePixels::from_tiles(2, [[R, DARK_R], [G, T], [R, R]]).unwrap();
        let mut doc = TilesetDocument::new(pixels);
        doc.tiles[0].palette_index = Some(0);
        doc.tiles[1].palette_index = Some(0);
        let palette = doc.recounted(&Palette::new(0));
        doc.palettes.push_back(palette);

        let mut history = CommandHistory::new(doc, HistoryConfig::default());
        history.register_namespace(&namespace());
        history
    }

    fn merge(target: Color) -> Command {
        Command::new(
            "image.mergeColors",
            MergeColors {
                color1: DARK_R,
                color2: R,
                target,
                palette_index: 0,
            },
        )
    }

    #[test]
    fn merge_recolors_member_tiles_only() {
        let mut h = history();
        let before = h.document().clone();
        h.execute_command(merge(R)).unwrap();

        let doc = h.document();
        assert_eq!(doc.tile_pixels(0), &[R, R]);
        assert_eq!(doc.tile_pixels(2), &[R, R]);
        let undo = h.history().back().and_then(|e| e.result_as::<MergeUndo>()).unwrap();
        assert_eq!(undo.pixels().len(), 1);

        let palette = doc.palette(0).unwrap();
        let reds: Vec<&ColorData> = palette.entries().filter(|e| e.color == R).collect();
        assert_eq!(reds.len(), 1);
        assert_eq!(reds[0].usage_count, 2);
        assert!(!palette.contains(DARK_R));
        assert_eq!(palette.colors.len(), 16);

        h.undo().unwrap();
        assert_eq!(h.document(), &before);
    }

    #[test]
    fn merge_into_new_color() {
        let mut h = history();
        let purple = Color::new(0x800080);
        h.execute_command(merge(purple)).unwrap();
        let doc = h.document();
        assert_eq!(doc.tile_pixels(0), &[purple, purple]);
        assert!(doc.palette(0).unwrap().contains(purple));
        assert!(!doc.palette(0).unwrap().contains(R));
    }

    #[test]
    fn merge_of_absent_colors_fails_cleanly() {
        let mut h = history();
        let before = h.document().clone();
        let err = h
            .execute_command(Command::new(
                "image.mergeColors",
                MergeColors {
                    color1: Color::new(1),
                    color2: Color::new(2),
                    target: R,
                    palette_index: 0,
                },
            ))
            .unwrap_err();
        assert!(matches!(err, CommandError::Handler(_)));
        assert_eq!(h.document(), &before);
    }
}
