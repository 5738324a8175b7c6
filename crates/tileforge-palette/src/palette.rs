#![forbid(unsafe_code)]

//! Fixed-size palettes with an overflow list.
//!
//! A [`Palette`] has [`PALETTE_SIZE`] addressable slots plus an unbounded
//! `unassigned` list for colors that do not fit. Slot 0 holds the
//! transparency color by convention; nothing here enforces it, but every
//! rebuild helper puts it back there.

use std::collections::VecDeque;

use ahash::AHashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorData, EMPTY_COLOR};

/// Number of addressable slots in a palette.
pub const PALETTE_SIZE: usize = 16;

/// A palette: 16 slots plus overflow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Palette {
    /// Palette number as referenced by tiles.
    pub index: usize,
    /// Addressable slots, at most [`PALETTE_SIZE`].
    pub colors: Vec<ColorData>,
    /// Colors that did not fit into the slots.
    pub unassigned: Vec<ColorData>,
}

impl Palette {
    /// An empty palette.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            colors: Vec::new(),
            unassigned: Vec::new(),
        }
    }

    /// Split a flat entry list into slots and overflow.
    #[must_use]
    pub fn from_entries(index: usize, mut entries: Vec<ColorData>) -> Self {
        let unassigned = if entries.len() > PALETTE_SIZE {
            entries.split_off(PALETTE_SIZE)
        } else {
            Vec::new()
        };
        Self {
            index,
            colors: entries,
            unassigned,
        }
    }

    /// Slots followed by overflow.
    pub fn entries(&self) -> impl Iterator<Item = &ColorData> {
        self.colors.iter().chain(&self.unassigned)
    }

    /// Slots followed by overflow, as an owned list.
    #[must_use]
    pub fn all_colors(&self) -> Vec<ColorData> {
        self.entries().copied().collect()
    }

    /// Total number of entries, slots and overflow.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len() + self.unassigned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.unassigned.is_empty()
    }

    /// True if any entry, slot or overflow, has `color`.
    #[must_use]
    pub fn contains(&self, color: Color) -> bool {
        self.entries().any(|entry| entry.color == color)
    }

    /// Position of the first entry with `color` in [`all_colors`](Self::all_colors) order.
    #[must_use]
    pub fn position_of(&self, color: Color) -> Option<usize> {
        self.entries().position(|entry| entry.color == color)
    }

    /// Drop unused entries after slot 0 and compact.
    ///
    /// Slot 0 is always kept. Used overflow entries move up into freed slots,
    /// and the slots are padded back to [`PALETTE_SIZE`] with unused `filler`
    /// entries.
    #[must_use]
    pub fn without_excess_empty_colors(&self, filler: Color) -> Self {
        let mut kept: Vec<ColorData> = self
            .entries()
            .enumerate()
            .filter(|(i, entry)| *i == 0 || !entry.is_unused())
            .map(|(_, entry)| *entry)
            .collect();
        while kept.len() < PALETTE_SIZE {
            kept.push(ColorData::new(filler, 0));
        }
        Self::from_entries(self.index, kept)
    }

    /// Rebuild usage counts from the pixels of the tiles assigned to this palette.
    ///
    /// Colors are ranked by pixel count (descending, first-seen order on
    /// ties). Existing slots keep their color while it is still used; freed
    /// slots take the most used remaining colors; `transparency` is pinned in
    /// slot 0 (keeping its pixel count if tiles use it). The slots are padded
    /// to [`PALETTE_SIZE`] and whatever is left goes to `unassigned`.
    #[must_use]
    pub fn updated_from_tiles<'a, I>(&self, tiles: I, transparency: Color) -> Self
    where
        I: IntoIterator<Item = &'a [Color]>,
    {
        let mut counts: AHashMap<Color, u32> = AHashMap::new();
        let mut first_seen: Vec<Color> = Vec::new();
        for pixels in tiles {
            for &pixel in pixels {
                let count = counts.entry(pixel).or_insert(0);
                if *count == 0 {
                    first_seen.push(pixel);
                }
                *count += 1;
            }
        }
        let mut pool: Vec<ColorData> = first_seen
            .into_iter()
            .map(|color| ColorData::new(color, counts.get(&color).copied().unwrap_or(0)))
            .collect();
        pool.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));

        let mut slots: Vec<Option<ColorData>> = self
            .colors
            .iter()
            .map(|existing| take_color(&mut pool, existing.color))
            .collect();

        let pinned_first = self.colors.first().is_some_and(|c| c.color == transparency);
        if pinned_first {
            let slot = slots[0].get_or_insert(ColorData::new(transparency, 0));
            slot.color = transparency;
        } else {
            let pinned =
                take_color(&mut pool, transparency).unwrap_or(ColorData::new(transparency, 0));
            slots.insert(0, Some(pinned));
        }

        let mut pool = VecDeque::from(pool);
        let mut entries: Vec<ColorData> = slots
            .into_iter()
            .map(|slot| slot.or_else(|| pool.pop_front()).unwrap_or(EMPTY_COLOR))
            .collect();
        while entries.len() < PALETTE_SIZE {
            entries.push(pool.pop_front().unwrap_or(EMPTY_COLOR));
        }
        // Pinning transparency may push the last slot into overflow.
        entries.extend(pool);
        Self::from_entries(self.index, entries)
    }

    /// Move `transparency` to slot 0 and repaint unused slots with it.
    ///
    /// Unused entries are then compacted away, padding with black.
    #[must_use]
    pub fn with_transparency(&self, transparency: Color) -> Self {
        let colors = with_item_first(&self.colors, |c| c.color == transparency)
            .into_iter()
            .map(|entry| {
                if entry.is_unused() {
                    ColorData::new(transparency, 0)
                } else {
                    entry
                }
            })
            .collect();
        Self {
            index: self.index,
            colors,
            unassigned: self.unassigned.clone(),
        }
        .without_excess_empty_colors(Color::BLACK)
    }
}

/// Remove and return the first entry with `color`.
fn take_color(pool: &mut Vec<ColorData>, color: Color) -> Option<ColorData> {
    let at = pool.iter().position(|entry| entry.color == color)?;
    Some(pool.remove(at))
}

/// Copy of `items` with the first match of `predicate` moved to the front.
///
/// The relative order of everything else is preserved; without a match the
/// copy is unchanged.
#[must_use]
pub fn with_item_first<T: Clone>(items: &[T], predicate: impl Fn(&T) -> bool) -> Vec<T> {
    let mut out = items.to_vec();
    if let Some(at) = items.iter().position(predicate) {
        let item = out.remove(at);
        out.insert(0, item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Color = Color::MAGENTA;
    const RED: Color = Color::new(0xff0000);
    const GREEN: Color = Color::new(0x00ff00);
    const BLUE: Color = Color::new(0x0000ff);

    fn cd(color: Color, usage: u32) -> ColorData {
        ColorData::new(color, usage)
    }

    #[test]
    fn from_entries_splits_at_slot_count() {
        let entries: Vec<ColorData> = (0..20).map(|i| cd(Color::new(i), 1)).collect();
        let palette = Palette::from_entries(3, entries);
        assert_eq!(palette.colors.len(), PALETTE_SIZE);
        assert_eq!(palette.unassigned.len(), 4);
        assert_eq!(palette.unassigned[0].color, Color::new(16));
        assert_eq!(palette.len(), 20);
    }

    #[test]
    fn without_excess_keeps_slot_zero_and_used() {
        let mut palette = Palette::new(0);
        palette.colors = vec![cd(T, 0), cd(RED, 0), cd(GREEN, 3)];
        palette.unassigned = vec![cd(BLUE, 2)];

        let compact = palette.without_excess_empty_colors(Color::BLACK);
        assert_eq!(compact.colors.len(), PALETTE_SIZE);
        assert_eq!(compact.colors[0], cd(T, 0));
        assert_eq!(compact.colors[1], cd(GREEN, 3));
        assert_eq!(compact.colors[2], cd(BLUE, 2));
        assert!(compact.colors[3..].iter().all(|c| *c == EMPTY_COLOR));
        assert!(compact.unassigned.is_empty());
    }

    #[test]
    fn updated_from_tiles_ranks_by_usage() {
        let tile_a = [RED, RED, GREEN, T];
        let tile_b = [RED, BLUE, BLUE];
        let palette = Palette::new(1).updated_from_tiles([&tile_a[..], &tile_b[..]], T);

        assert_eq!(palette.index, 1);
        assert_eq!(palette.colors[0], cd(T, 1));
        assert_eq!(palette.colors[1], cd(RED, 3));
        assert_eq!(palette.colors[2], cd(BLUE, 2));
        assert_eq!(palette.colors[3], cd(GREEN, 1));
        assert_eq!(palette.colors.len(), PALETTE_SIZE);
        assert!(palette.unassigned.is_empty());
    }

    #[test]
    fn updated_from_tiles_keeps_existing_slots() {
        let mut palette = Palette::new(0);
        palette.colors = vec![cd(T, 0), cd(BLUE, 9), cd(GREEN, 9), cd(RED, 9)];

        // GREEN disappears; RED and BLUE stay in place, the freed slot takes WHITE.
        let white = Color::new(0xffffff);
        let tile = [RED, BLUE, white, white];
        let updated = palette.updated_from_tiles([&tile[..]], T);

        assert_eq!(updated.colors[0], cd(T, 0));
        assert_eq!(updated.colors[1], cd(BLUE, 1));
        assert_eq!(updated.colors[2], cd(white, 2));
        assert_eq!(updated.colors[3], cd(RED, 1));
        assert!(!updated.contains(GREEN));
    }

    #[test]
    fn updated_from_tiles_overflows() {
        let tile: Vec<Color> = (1..=20).map(Color::new).collect();
        let updated = Palette::new(0).updated_from_tiles([tile.as_slice()], T);
        assert_eq!(updated.colors.len(), PALETTE_SIZE);
        assert_eq!(updated.unassigned.len(), 5);
        assert_eq!(updated.len(), 21);
    }

    #[test]
    fn pinning_into_full_palette_spills_last_slot() {
        let colors: Vec<ColorData> = (1..=16).map(|i| cd(Color::new(i), 1)).collect();
        let palette = Palette::from_entries(0, colors);
        let tile: Vec<Color> = (1..=16).map(Color::new).chain([T]).collect();

        let updated = palette.updated_from_tiles([tile.as_slice()], T);
        assert_eq!(updated.colors.len(), PALETTE_SIZE);
        assert_eq!(updated.colors[0], cd(T, 1));
        assert_eq!(updated.unassigned, vec![cd(Color::new(16), 1)]);
    }

    #[test]
    fn with_transparency_moves_and_repaints() {
        let mut palette = Palette::new(0);
        palette.colors = vec![cd(RED, 4), cd(GREEN, 0), cd(BLUE, 2)];

        let updated = palette.with_transparency(GREEN);
        assert_eq!(updated.colors[0], cd(GREEN, 0));
        assert_eq!(updated.colors[1], cd(RED, 4));
        assert_eq!(updated.colors[2], cd(BLUE, 2));
        assert_eq!(updated.colors[3], EMPTY_COLOR);
    }

    #[test]
    fn with_item_first_moves_first_match_only() {
        assert_eq!(with_item_first(&[1, 2, 3, 2], |x| *x == 2), vec![2, 1, 3, 2]);
        assert_eq!(with_item_first(&[1, 2, 3], |x| *x == 9), vec![1, 2, 3]);
    }

    #[test]
    fn position_and_contains_cover_overflow() {
        let entries: Vec<ColorData> = (0..18).map(|i| cd(Color::new(i), 1)).collect();
        let palette = Palette::from_entries(0, entries);
        assert!(palette.contains(Color::new(17)));
        assert_eq!(palette.position_of(Color::new(17)), Some(17));
        assert_eq!(palette.position_of(Color::new(99)), None);
    }
}
