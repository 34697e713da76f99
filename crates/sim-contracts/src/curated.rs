//! Hand-authored imagery placed at the center of the grid.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use sim_core::catalog::{CuratedPattern, PATTERNS};
use sim_core::{ColorId, Pattern};

/// Curated patterns that fit a `width` x `height` grid and only use colors
/// from `available`.
pub fn eligible(
    width: u32,
    height: u32,
    available: &BTreeSet<ColorId>,
) -> Vec<&'static CuratedPattern> {
    PATTERNS
        .iter()
        .filter(|p| p.fits(width, height))
        .filter(|p| p.colors().iter().all(|c| available.contains(*c)))
        .collect()
}

/// Picks one eligible pattern at random.
pub fn pick<R: Rng>(
    width: u32,
    height: u32,
    available: &BTreeSet<ColorId>,
    rng: &mut R,
) -> Option<&'static CuratedPattern> {
    eligible(width, height, available).choose(rng).copied()
}

/// Copies `curated` into a `width` x `height` pattern, centered. Odd margins
/// leave the extra column or row on the right and bottom.
#[must_use]
pub fn center_fit(curated: &CuratedPattern, width: u32, height: u32) -> Pattern {
    let mut pattern = Pattern::empty(width, height);
    let dx = width.saturating_sub(curated.width()) / 2;
    let dy = height.saturating_sub(curated.height()) / 2;
    for y in 0..curated.height() {
        for x in 0..curated.width() {
            if let Some(color) = curated.cell(x, y) {
                let _ = pattern.set((x + dx) as i32, (y + dy) as i32, Some(ColorId::from(color)));
            }
        }
    }
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::catalog::COLORS;

    fn all_colors() -> BTreeSet<ColorId> {
        COLORS.iter().map(|c| ColorId::from(c.id)).collect()
    }

    #[test]
    fn center_fit_keeps_every_cell() {
        for curated in PATTERNS {
            let (w, h) = (curated.width() + 3, curated.height() + 4);
            let pattern = center_fit(curated, w, h);
            assert_eq!((pattern.width(), pattern.height()), (w, h));
            let expected = curated
                .rows
                .iter()
                .flat_map(|r| r.chars())
                .filter(|c| *c != '.')
                .count() as u32;
            assert_eq!(pattern.cell_count(), expected, "{}", curated.name);
            assert_eq!(
                pattern.get(1, 2).map(ColorId::as_str),
                curated.cell(0, 0),
                "{} is not centered",
                curated.name
            );
        }
    }

    #[test]
    fn eligibility_checks_size_and_colors() {
        let everything = all_colors();
        assert!(eligible(4, 4, &everything).is_empty());
        let small = eligible(6, 6, &everything);
        assert!(!small.is_empty());
        assert!(small.iter().all(|p| p.width() <= 6 && p.height() <= 6));

        let limited: BTreeSet<ColorId> = ["black", "green"].into_iter().map(ColorId::from).collect();
        let fitting = eligible(32, 32, &limited);
        assert_eq!(fitting.iter().map(|p| p.name).collect::<Vec<_>>(), vec!["tree"]);
    }
}
