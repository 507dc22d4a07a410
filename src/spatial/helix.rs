//! Inside-out spiral over grid offsets
//!
//! Visits the centre first, then each square ring outward. Ring `t` starts at
//! `(t, 1 - t)` and walks down the right edge, left along the bottom, up the
//! left edge and right along the top (screen coordinates, y grows down):
//!
//! ```text
//! 20 21 22 23 24
//! 19  6  7  8  9
//! 18  5  0  1 10
//! 17  4  3  2 11
//! 16 15 14 13 12
//! ```
//!
//! Used to find the nearest usable cell for drops and teleport landings.

/// Default search radius (a 7x7 window)
pub const DEFAULT_HELIX_RADIUS: u32 = 3;

/// Offsets in spiral order, `(2r + 1)^2` of them
pub fn helix(radius: u32) -> impl Iterator<Item = (i64, i64)> {
    std::iter::once((0, 0)).chain((1..=i64::from(radius)).flat_map(ring))
}

fn ring(t: i64) -> impl Iterator<Item = (i64, i64)> {
    let right = (1 - t..=t).map(move |y| (t, y));
    let bottom = (-t..t).rev().map(move |x| (x, t));
    let left = (-t..t).rev().map(move |y| (-t, y));
    let top = (1 - t..=t).map(move |x| (x, -t));
    right.chain(bottom).chain(left).chain(top)
}
