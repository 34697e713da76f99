//! Hand-authored pixel patterns.
//!
//! Rows are written as text, one character per cell. `.` is empty; other
//! characters map to colors through [`legend`].

use std::collections::BTreeSet;

/// Size bucket of a curated pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeTier {
    /// Fits a 6x6 grid.
    Small,
    /// Fits an 8x8 grid.
    Medium,
    /// Needs at least a 10x10 grid.
    Large,
}

/// Named pixel pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CuratedPattern {
    /// Display name.
    pub name: &'static str,
    /// Size bucket.
    pub tier: SizeTier,
    /// Rows, top to bottom. All rows have equal length.
    pub rows: &'static [&'static str],
}

impl CuratedPattern {
    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.rows.first().map_or(0, |r| r.len() as u32)
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Color at `(x, y)` in pattern space.
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> Option<&'static str> {
        let row = self.rows.get(y as usize)?;
        legend(*row.as_bytes().get(x as usize)? as char)
    }

    /// Distinct colors used.
    #[must_use]
    pub fn colors(&self) -> BTreeSet<&'static str> {
        self.rows
            .iter()
            .flat_map(|row| row.chars())
            .filter_map(legend)
            .collect()
    }

    /// Whether the pattern fits inside a `width` x `height` grid.
    #[must_use]
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width() <= width && self.height() <= height
    }
}

/// Maps a pattern character to a color id.
#[must_use]
pub fn legend(ch: char) -> Option<&'static str> {
    Some(match ch {
        'K' => "black",
        'W' => "white",
        'R' => "red",
        'B' => "blue",
        'G' => "green",
        'Y' => "yellow",
        'O' => "orange",
        'P' => "purple",
        'I' => "pink",
        'C' => "cyan",
        'N' => "brown",
        _ => return None,
    })
}

/// The curated library.
pub const PATTERNS: &[CuratedPattern] = &[
    CuratedPattern {
        name: "heart",
        tier: SizeTier::Small,
        rows: &[
            ".R.R.", //
            "RRRRR", //
            "RRRRR", //
            ".RRR.", //
            "..R..",
        ],
    },
    CuratedPattern {
        name: "arrow",
        tier: SizeTier::Small,
        rows: &[
            "..B..", //
            ".BBB.", //
            "B.B.B", //
            "..B..", //
            "..B..",
        ],
    },
    CuratedPattern {
        name: "flower",
        tier: SizeTier::Small,
        rows: &[
            ".Y.Y.", //
            "YYRYY", //
            ".YYY.", //
            "..G..", //
            ".GG..", //
            "..G..",
        ],
    },
    CuratedPattern {
        name: "smiley",
        tier: SizeTier::Small,
        rows: &[
            ".YYYY.", //
            "YKYYKY", //
            "YYYYYY", //
            "YKYYKY", //
            "YYKKYY", //
            ".YYYY.",
        ],
    },
    CuratedPattern {
        name: "house",
        tier: SizeTier::Medium,
        rows: &[
            "...RR...", //
            "..RRRR..", //
            ".RRRRRR.", //
            "RRRRRRRR", //
            ".WWWWWW.", //
            ".WBWWBW.", //
            ".WWKKWW.", //
            ".WWKKWW.",
        ],
    },
    CuratedPattern {
        name: "tree",
        tier: SizeTier::Medium,
        rows: &[
            "...GG...", //
            "..GGGG..", //
            ".GGGGGG.", //
            "GGGGGGGG", //
            "..GGGG..", //
            "...KK...", //
            "...KK...", //
            "..KKKK..",
        ],
    },
    CuratedPattern {
        name: "mushroom",
        tier: SizeTier::Medium,
        rows: &[
            "..RRRR..", //
            ".RWRRWR.", //
            "RRRRRRRR", //
            "RWRRRRWR", //
            "..WWWW..", //
            "..WKWW..", //
            "..WWWW..", //
            "...WW...",
        ],
    },
    CuratedPattern {
        name: "sailboat",
        tier: SizeTier::Medium,
        rows: &[
            "...W....", //
            "...WW...", //
            "...WWW..", //
            "...WWWW.", //
            "...K....", //
            "RRRRRRRR", //
            ".RRRRRR.", //
            "BBBBBBBB",
        ],
    },
    CuratedPattern {
        name: "ghost",
        tier: SizeTier::Large,
        rows: &[
            "...PPPP...", //
            ".PPPPPPPP.", //
            "PPWWPPWWPP", //
            "PPWKPPWKPP", //
            "PPPPPPPPPP", //
            "PPPPPPPPPP", //
            "PPPPPPPPPP", //
            "PPPPPPPPPP", //
            "PP.PPP.PPP", //
            "P...P...PP",
        ],
    },
    CuratedPattern {
        name: "cat",
        tier: SizeTier::Large,
        rows: &[
            "K........K", //
            "KK......KK", //
            "KKK....KKK", //
            "KKKKKKKKKK", //
            "KKGKKKKGKK", //
            "KKKKKKKKKK", //
            "KKKKIIKKKK", //
            ".KKKKKKKK.", //
            "..KKKKKK..", //
            "...KKKK...",
        ],
    },
    CuratedPattern {
        name: "sunrise",
        tier: SizeTier::Large,
        rows: &[
            "CCCCCCCCCCCC", //
            "CCCCCYYCCCCC", //
            "CCCYYYYYYCCC", //
            "CCYYYOOYYYCC", //
            "CYYYOOOOYYYC", //
            "CYYOOOOOOYYC", //
            "BBBBBBBBBBBB", //
            "BBWBBBBBWBBB", //
            "BBBBBWBBBBBB", //
            "BBBBBBBBBBBB",
        ],
    },
];

/// Patterns in a size tier.
pub fn patterns_in_tier(tier: SizeTier) -> impl Iterator<Item = &'static CuratedPattern> {
    PATTERNS.iter().filter(move |p| p.tier == tier)
}
