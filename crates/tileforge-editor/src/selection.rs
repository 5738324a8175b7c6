#![forbid(unsafe_code)]

//! Two-color selection for merging.

use tileforge_palette::Color;

use crate::commands::image::MergeColors;

/// Up to two colors picked from one palette.
///
/// Picking from another palette starts over; picking a selected color
/// deselects it; otherwise the newest pick joins the previous one and the
/// oldest is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorSelection {
    palette_index: Option<usize>,
    colors: Vec<Color>,
}

impl ColorSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one pick.
    pub fn select(&mut self, palette_index: usize, color: Color) {
        if self.palette_index != Some(palette_index) {
            self.palette_index = Some(palette_index);
            self.colors = vec![color];
        } else if let Some(at) = self.colors.iter().position(|&c| c == color) {
            self.colors.remove(at);
        } else {
            match self.colors.last() {
                Some(&last) => self.colors = vec![last, color],
                None => self.colors.push(color),
            }
        }
    }

    #[must_use]
    pub fn palette_index(&self) -> Option<usize> {
        self.palette_index
    }

    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[must_use]
    pub fn is_selected(&self, palette_index: usize, color: Color) -> bool {
        self.palette_index == Some(palette_index) && self.colors.contains(&color)
    }

    pub fn clear(&mut self) {
        self.palette_index = None;
        self.colors.clear();
    }

    /// A merge of the two selected colors into `target`, if two are selected.
    #[must_use]
    pub fn merge_into(&self, target: Color) -> Option<MergeColors> {
        match (self.palette_index, self.colors.as_slice()) {
            (Some(palette_index), &[color1, color2]) => Some(MergeColors {
                color1,
                color2,
                target,
                palette_index,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Color = Color::new(0x111111);
    const B: Color = Color::new(0x222222);
    const C: Color = Color::new(0x333333);

    #[test]
    fn keeps_the_last_two_picks() {
        let mut sel = ColorSelection::new();
        sel.select(0, A);
        sel.select(0, B);
        assert_eq!(sel.colors(), &[A, B]);
        sel.select(0, C);
        assert_eq!(sel.colors(), &[B, C]);
    }

    #[test]
    fn repick_deselects() {
        let mut sel = ColorSelection::new();
        sel.select(0, A);
        sel.select(0, B);
        sel.select(0, A);
        assert_eq!(sel.colors(), &[B]);
        sel.select(0, B);
        assert!(sel.colors().is_empty());
        sel.select(0, C);
        assert_eq!(sel.colors(), &[C]);
    }

    #[test]
    fn other_palette_starts_over() {
        let mut sel = ColorSelection::new();
        sel.select(0, A);
        sel.select(0, B);
        sel.select(1, A);
        assert_eq!(sel.palette_index(), Some(1));
        assert_eq!(sel.colors(), &[A]);
        assert!(!sel.is_selected(0, A));
        assert!(sel.is_selected(1, A));
    }

    #[test]
    fn merge_needs_two_colors() {
        let mut sel = ColorSelection::new();
        sel.select(2, A);
        assert_eq!(sel.merge_into(C), None);
        sel.select(2, B);
        assert_eq!(
            sel.merge_into(C),
            Some(MergeColors {
                color1: A,
                color2: B,
                target: C,
                palette_index: 2,
            })
        );
        sel.clear();
        assert_eq!(sel.merge_into(C), None);
    }
}
