#![forbid(unsafe_code)]

//! Palette-level sorting.

use crate::cluster::ClusterSorter;
use crate::color::{Color, ColorData};
use crate::error::PaletteError;
use crate::palette::Palette;
use crate::space::ColorSpace;

/// Reorder every entry after slot 0 so that neighboring colors are similar.
///
/// Slot 0 stays pinned. Slots 1.. and the overflow are clustered together,
/// then mapped back to the original entries by color so usage counts
/// survive, and the result is split at the slot count again.
///
/// # Errors
///
/// [`PaletteError::MissingEntry`] if the sorted order names an entry that is
/// not in the palette.
pub fn sorted_palette<S: ColorSpace>(
    palette: &Palette,
    sorter: &ClusterSorter<S>,
) -> Result<Palette, PaletteError> {
    let Some((&pinned, fixed)) = palette.colors.split_first() else {
        return Ok(palette.clone());
    };
    if palette.colors.len() < 2 {
        return Ok(palette.clone());
    }

    let candidates: Vec<ColorData> = fixed.iter().chain(&palette.unassigned).copied().collect();
    let colors: Vec<Color> = candidates.iter().map(|entry| entry.color).collect();

    let mut entries = Vec::with_capacity(palette.len());
    entries.push(pinned);
    for id in sorter.order(&colors) {
        let entry = candidates
            .get(id)
            .ok_or(PaletteError::MissingEntry { id })?;
        entries.push(*entry);
    }

    tracing::debug!(
        palette = palette.index,
        entries = entries.len(),
        "sorted palette"
    );
    Ok(Palette::from_entries(palette.index, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterConfig;
    use crate::palette::PALETTE_SIZE;
    use crate::space::RgbSpace;

    fn sorter() -> ClusterSorter<RgbSpace> {
        ClusterSorter::new(RgbSpace, ClusterConfig::seeded(42))
    }

    #[test]
    fn slot_zero_is_pinned_and_counts_survive() {
        let t = ColorData::new(Color::MAGENTA, 5);
        let mut palette = Palette::new(2);
        palette.colors = vec![
            t,
            ColorData::new(Color::from_rgb(250, 250, 250), 1),
            ColorData::new(Color::from_rgb(0, 0, 0), 2),
            ColorData::new(Color::from_rgb(245, 245, 245), 3),
            ColorData::new(Color::from_rgb(5, 5, 5), 4),
        ];

        let sorted = sorted_palette(&palette, &sorter()).unwrap();
        assert_eq!(sorted.index, 2);
        assert_eq!(sorted.colors[0], t);
        assert_eq!(sorted.len(), palette.len());
        for entry in palette.entries() {
            assert!(sorted.entries().any(|e| e == entry), "lost {entry:?}");
        }

        let dark: Vec<usize> = [0u32, 0x050505]
            .iter()
            .filter_map(|&c| sorted.position_of(Color::new(c)))
            .collect();
        assert_eq!(dark[0].abs_diff(dark[1]), 1);
    }

    #[test]
    fn overflow_is_sorted_with_slots() {
        let mut entries = vec![ColorData::new(Color::MAGENTA, 0)];
        entries.extend((0..20u8).map(|i| ColorData::new(Color::from_rgb(i * 10, 0, 0), 1)));
        let palette = Palette::from_entries(0, entries);
        assert_eq!(palette.unassigned.len(), 5);

        let sorted = sorted_palette(&palette, &sorter()).unwrap();
        assert_eq!(sorted.colors.len(), PALETTE_SIZE);
        assert_eq!(sorted.unassigned.len(), 5);
        assert_eq!(sorted.colors[0].color, Color::MAGENTA);
    }

    #[test]
    fn tiny_palettes_are_unchanged() {
        let empty = Palette::new(0);
        assert_eq!(sorted_palette(&empty, &sorter()).unwrap(), empty);

        let mut single = Palette::new(1);
        single.colors = vec![ColorData::new(Color::MAGENTA, 0)];
        assert_eq!(sorted_palette(&single, &sorter()).unwrap(), single);
    }
}
