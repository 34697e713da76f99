//! Procedural shape archetypes.
//!
//! Every routine draws onto a [`Canvas`] that refuses writes once the target
//! count is reached, so routines just walk their shape and stop when `plot`
//! reports the canvas is full. Shapes clipped by the grid edge come out
//! smaller than the target; the contract records whatever was placed.

use rand::seq::SliceRandom;
use rand::Rng;
use sim_core::catalog::Complexity;
use sim_core::{ColorId, Pattern};

/// Shape families used by the procedural generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Straight horizontal or vertical run.
    Line,
    /// Blob grown from a seed cell.
    DotCluster,
    /// Two arms hugging a grid corner.
    Corner,
    /// Filled square.
    Square,
    /// Vertical stroke with a foot.
    LShape,
    /// Bar with a centered stem.
    TShape,
    /// Plus sign grown evenly from its center.
    Cross,
    /// 45 degree run.
    Diagonal,
    /// Square outline.
    HollowSquare,
    /// Two-row sawtooth.
    Zigzag,
    /// Uniformly random cells.
    Scattered,
    /// Part of the grid border.
    PartialFrame,
    /// Alternating cells in a block.
    Checkerboard,
    /// Outward spiral with gaps between turns.
    Spiral,
}

impl ShapeKind {
    /// Archetypes eligible for a complexity tier.
    #[must_use]
    pub fn for_complexity(complexity: Complexity) -> &'static [ShapeKind] {
        use ShapeKind::*;
        match complexity {
            Complexity::Trivial => &[Line, DotCluster, Corner],
            Complexity::Simple => &[Line, DotCluster, Corner, Square, Diagonal],
            Complexity::Moderate => &[Square, LShape, TShape, Cross, Diagonal, Zigzag],
            Complexity::Complex => &[
                LShape,
                TShape,
                Cross,
                HollowSquare,
                Zigzag,
                Scattered,
                Checkerboard,
            ],
            Complexity::Intricate => &[
                HollowSquare,
                Zigzag,
                Scattered,
                PartialFrame,
                Checkerboard,
                Spiral,
            ],
            Complexity::Masterwork => &[PartialFrame, Checkerboard, Scattered, Spiral, Cross],
        }
    }

    /// Draws this shape onto `canvas`.
    pub fn draw<R: Rng>(self, canvas: &mut Canvas<'_, R>) {
        match self {
            Self::Line => line(canvas),
            Self::DotCluster => dot_cluster(canvas),
            Self::Corner => corner(canvas),
            Self::Square => square(canvas),
            Self::LShape => l_shape(canvas),
            Self::TShape => t_shape(canvas),
            Self::Cross => cross(canvas),
            Self::Diagonal => diagonal(canvas),
            Self::HollowSquare => hollow_square(canvas),
            Self::Zigzag => zigzag(canvas),
            Self::Scattered => scattered(canvas),
            Self::PartialFrame => partial_frame(canvas),
            Self::Checkerboard => checkerboard(canvas),
            Self::Spiral => spiral(canvas),
        }
    }
}

/// Color source for a shape.
#[derive(Clone, Debug)]
pub enum Brush {
    /// Whole shape in one color.
    Solid(ColorId),
    /// Each cell drawn from the palette.
    Palette(Vec<ColorId>),
}

/// Pattern under construction with a cell budget.
pub struct Canvas<'r, R: Rng> {
    pattern: Pattern,
    width: i32,
    height: i32,
    target: u32,
    placed: u32,
    brush: Brush,
    rng: &'r mut R,
}

impl<'r, R: Rng> Canvas<'r, R> {
    /// Empty `width` x `height` canvas. `target` is clamped to the area.
    pub fn new(width: u32, height: u32, target: u32, brush: Brush, rng: &'r mut R) -> Self {
        let area = width.saturating_mul(height);
        Self {
            pattern: Pattern::empty(width, height),
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            target: target.min(area),
            placed: 0,
            brush,
            rng,
        }
    }

    /// True once the budget is spent.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.placed >= self.target
    }

    /// Cells placed so far.
    #[must_use]
    pub fn placed(&self) -> u32 {
        self.placed
    }

    /// Paints `(x, y)` if it is in bounds, empty and the budget allows.
    pub fn plot(&mut self, x: i32, y: i32) -> bool {
        if self.is_full() || self.pattern.get(x, y).is_some() {
            return false;
        }
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        let color = match &self.brush {
            Brush::Solid(color) => color.clone(),
            Brush::Palette(palette) => match palette.choose(&mut *self.rng) {
                Some(color) => color.clone(),
                None => return false,
            },
        };
        if self.pattern.set(x, y, Some(color)) {
            self.placed += 1;
            true
        } else {
            false
        }
    }

    /// Places one cell somewhere empty. Used when a shape placed nothing.
    pub fn plot_anywhere(&mut self) -> bool {
        let empty: Vec<(i32, i32)> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.pattern.get(x, y).is_none())
            .collect();
        match empty.choose(&mut *self.rng) {
            Some(&(x, y)) => self.plot(x, y),
            None => false,
        }
    }

    /// Finished pattern.
    #[must_use]
    pub fn finish(self) -> Pattern {
        self.pattern
    }

    fn remaining(&self) -> u32 {
        self.target.saturating_sub(self.placed)
    }

    fn random_x(&mut self) -> i32 {
        self.rng.gen_range(0..self.width.max(1))
    }

    fn random_y(&mut self) -> i32 {
        self.rng.gen_range(0..self.height.max(1))
    }

    /// Random origin such that a `w` x `h` box stays inside the grid when
    /// possible.
    fn origin_for(&mut self, w: i32, h: i32) -> (i32, i32) {
        let max_x = (self.width - w).max(0);
        let max_y = (self.height - h).max(0);
        (self.rng.gen_range(0..=max_x), self.rng.gen_range(0..=max_y))
    }
}

/// Side of the smallest square holding `n` cells.
fn side_for(n: u32) -> i32 {
    let mut side = 1;
    while (side * side) < n as i32 {
        side += 1;
    }
    side
}

fn line<R: Rng>(c: &mut Canvas<'_, R>) {
    let len = c.remaining() as i32;
    if c.rng.gen_bool(0.5) {
        let (x0, y) = c.origin_for(len, 1);
        for x in x0..x0 + len {
            c.plot(x, y);
        }
    } else {
        let (x, y0) = c.origin_for(1, len);
        for y in y0..y0 + len {
            c.plot(x, y);
        }
    }
}

fn dot_cluster<R: Rng>(c: &mut Canvas<'_, R>) {
    const STEPS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    let seed = (c.random_x(), c.random_y());
    c.plot(seed.0, seed.1);
    let mut grown = vec![seed];
    let mut attempts = c.target.saturating_mul(8);
    while !c.is_full() && attempts > 0 {
        attempts -= 1;
        let Some(&(x, y)) = grown.choose(&mut *c.rng) else {
            break;
        };
        let Some(&(dx, dy)) = STEPS.choose(&mut *c.rng) else {
            break;
        };
        if c.plot(x + dx, y + dy) {
            grown.push((x + dx, y + dy));
        }
    }
}

fn corner<R: Rng>(c: &mut Canvas<'_, R>) {
    let right = c.rng.gen_bool(0.5);
    let bottom = c.rng.gen_bool(0.5);
    let (x0, dx) = if right { (c.width - 1, -1) } else { (0, 1) };
    let (y0, dy) = if bottom { (c.height - 1, -1) } else { (0, 1) };
    c.plot(x0, y0);
    let mut step = 1;
    while !c.is_full() && (step < c.width || step < c.height) {
        c.plot(x0 + dx * step, y0);
        c.plot(x0, y0 + dy * step);
        step += 1;
    }
}

fn square<R: Rng>(c: &mut Canvas<'_, R>) {
    let side = side_for(c.remaining());
    let (x0, y0) = c.origin_for(side, side);
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            c.plot(x, y);
        }
    }
}

fn l_shape<R: Rng>(c: &mut Canvas<'_, R>) {
    let n = c.remaining() as i32;
    let foot = (n / 3).max(1);
    let stem = (n - foot).max(1);
    let (x0, y0) = c.origin_for(foot + 1, stem);
    for y in y0..y0 + stem {
        c.plot(x0, y);
    }
    let base = y0 + stem - 1;
    for x in x0 + 1..=x0 + foot {
        c.plot(x, base);
    }
}

fn t_shape<R: Rng>(c: &mut Canvas<'_, R>) {
    let n = c.remaining() as i32;
    let mut bar = (n / 2) | 1;
    bar = bar.min(c.width.max(1));
    let stem = (n - bar).max(0);
    let (x0, y0) = c.origin_for(bar, stem + 1);
    for x in x0..x0 + bar {
        c.plot(x, y0);
    }
    let mid = x0 + bar / 2;
    for y in y0 + 1..=y0 + stem {
        c.plot(mid, y);
    }
}

fn cross<R: Rng>(c: &mut Canvas<'_, R>) {
    let arm = ((c.remaining() as i32 - 1) / 4).max(1);
    let (x0, y0) = c.origin_for(2 * arm + 1, 2 * arm + 1);
    let (cx, cy) = (x0 + arm, y0 + arm);
    c.plot(cx, cy);
    for reach in 1..=arm.max(c.width).max(c.height) {
        if c.is_full() {
            break;
        }
        c.plot(cx + reach, cy);
        c.plot(cx - reach, cy);
        c.plot(cx, cy + reach);
        c.plot(cx, cy - reach);
    }
}

fn diagonal<R: Rng>(c: &mut Canvas<'_, R>) {
    let len = (c.remaining() as i32).min(c.width.min(c.height));
    let (x0, y0) = c.origin_for(len, len);
    let rising = c.rng.gen_bool(0.5);
    for i in 0..len {
        let y = if rising { y0 + len - 1 - i } else { y0 + i };
        c.plot(x0 + i, y);
    }
}

fn hollow_square<R: Rng>(c: &mut Canvas<'_, R>) {
    // Perimeter of a side-s square is 4(s - 1).
    let side = ((c.remaining() as i32 + 3) / 4 + 1).clamp(2, c.width.min(c.height).max(2));
    let (x0, y0) = c.origin_for(side, side);
    let last = side - 1;
    for i in 0..last {
        c.plot(x0 + i, y0);
        c.plot(x0 + last, y0 + i);
        c.plot(x0 + last - i, y0 + last);
        c.plot(x0, y0 + last - i);
    }
}

fn zigzag<R: Rng>(c: &mut Canvas<'_, R>) {
    let len = c.remaining() as i32;
    let (x0, y0) = c.origin_for(len, 2);
    let mut x = x0;
    while !c.is_full() && x < c.width {
        let y = if (x - x0) % 2 == 0 { y0 } else { y0 + 1 };
        c.plot(x, y);
        x += 1;
    }
    // Wrap onto a lower band when the first one hit the edge.
    let mut x = 0;
    while !c.is_full() && x < c.width {
        let y = if x % 2 == 0 { y0 + 2 } else { y0 + 3 };
        c.plot(x, y);
        x += 1;
    }
}

fn scattered<R: Rng>(c: &mut Canvas<'_, R>) {
    let mut attempts = c.target.saturating_mul(10);
    while !c.is_full() && attempts > 0 {
        attempts -= 1;
        let (x, y) = (c.random_x(), c.random_y());
        c.plot(x, y);
    }
}

fn partial_frame<R: Rng>(c: &mut Canvas<'_, R>) {
    let border = border_walk(c.width, c.height);
    if border.is_empty() {
        return;
    }
    let start = c.rng.gen_range(0..border.len());
    for &(x, y) in border.iter().cycle().skip(start).take(border.len()) {
        if c.is_full() {
            break;
        }
        c.plot(x, y);
    }
}

/// Grid border cells, clockwise from the top-left corner.
fn border_walk(width: i32, height: i32) -> Vec<(i32, i32)> {
    if width <= 0 || height <= 0 {
        return Vec::new();
    }
    let mut cells = Vec::new();
    cells.extend((0..width).map(|x| (x, 0)));
    cells.extend((1..height).map(|y| (width - 1, y)));
    if height > 1 {
        cells.extend((0..width - 1).rev().map(|x| (x, height - 1)));
    }
    if width > 1 {
        cells.extend((1..height - 1).rev().map(|y| (0, y)));
    }
    cells
}

fn checkerboard<R: Rng>(c: &mut Canvas<'_, R>) {
    let side = side_for(c.remaining() * 2);
    let (x0, y0) = c.origin_for(side, side);
    let parity = i32::from(c.rng.gen_bool(0.5));
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            if (x + y) % 2 == parity {
                c.plot(x, y);
            }
        }
    }
}

fn spiral<R: Rng>(c: &mut Canvas<'_, R>) {
    const DIRS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
    let (mut x, mut y) = (c.width / 2, c.height / 2);
    c.plot(x, y);
    let mut run = 1;
    let mut dir = 0;
    let limit = c.width.max(c.height) * 2;
    // Runs grow by two every turn pair so the arms never touch.
    while !c.is_full() && run <= limit {
        for _ in 0..2 {
            let (dx, dy) = DIRS[dir % 4];
            for _ in 0..run {
                x += dx;
                y += dy;
                c.plot(x, y);
            }
            dir += 1;
        }
        run += 2;
    }
}
