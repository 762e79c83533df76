//! `GridTopology`: flat indexing and wrapping for an equirectangular raster.
//!
//! `flat = x + y * width`. The x axis always wraps modulo `width`. The y axis
//! either reflects across the poles (crossing a pole lands in the mirrored
//! row, half a turn of longitude away) or wraps like a torus.
//!
//! The half-turn shift is its own inverse only when `width` is even (or 1),
//! so pole reflection requires such a width; otherwise crossing a pole
//! would not lead back and adjacency would be one-way.

use crate::config::VerticalWrap;
use crate::region_error::RegionError;

/// Offsets of the 4-neighbourhood in `(dx, dy)` order: west, east, north, south.
pub const NEIGHBOUR_OFFSETS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Raster dimensions plus the wrap rule for rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTopology {
    width: u32,
    height: u32,
    vertical: VerticalWrap,
}

impl GridTopology {
    /// Spherical raster: x wraps, y reflects across the poles.
    pub fn new(width: u32, height: u32) -> Result<Self, RegionError> {
        Self::with_wrap(width, height, VerticalWrap::PoleReflect)
    }

    /// Fails with [`RegionError::InvalidGrid`] on an empty raster, or on an
    /// odd `width > 1` under [`VerticalWrap::PoleReflect`].
    pub fn with_wrap(width: u32, height: u32, vertical: VerticalWrap) -> Result<Self, RegionError> {
        let one_way_pole = vertical == VerticalWrap::PoleReflect && width > 1 && width % 2 == 1;
        if width == 0 || height == 0 || one_way_pole {
            return Err(RegionError::InvalidGrid { width, height });
        }
        Ok(Self {
            width,
            height,
            vertical,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn vertical(&self) -> VerticalWrap {
        self.vertical
    }

    /// Total number of pixels, the size of every per-run array over this grid.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Flat index of an in-range pixel.
    #[inline]
    pub fn flat(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        x as usize + y as usize * self.width as usize
    }

    /// Checked flat index.
    pub fn try_flat(&self, x: u32, y: u32) -> Result<usize, RegionError> {
        if x >= self.width || y >= self.height {
            return Err(RegionError::IndexOutOfRange {
                container: "GridTopology",
                index: x as usize + y as usize * self.width as usize,
                len: self.pixel_count(),
            });
        }
        Ok(self.flat(x, y))
    }

    /// `(x, y)` of a flat index.
    #[inline]
    pub fn coords(&self, flat: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((flat % w) as u32, (flat / w) as u32)
    }

    /// Map any integer coordinate back onto the raster.
    pub fn wrap(&self, x: i64, y: i64) -> (u32, u32) {
        let w = i64::from(self.width);
        let h = i64::from(self.height);
        let (mut x, mut y) = (x, y);
        match self.vertical {
            VerticalWrap::Torus => {
                y = y.rem_euclid(h);
            }
            VerticalWrap::PoleReflect => {
                // Each reflection crosses one pole; far-out rows may cross several.
                while y < 0 || y >= h {
                    y = if y < 0 { -y - 1 } else { 2 * h - y - 1 };
                    x += w / 2;
                }
            }
        }
        (x.rem_euclid(w) as u32, y as u32)
    }

    /// Flat index of a possibly out-of-range coordinate.
    #[inline]
    pub fn wrap_flat(&self, x: i64, y: i64) -> usize {
        let (x, y) = self.wrap(x, y);
        self.flat(x, y)
    }

    /// Offset a flat index by `(dx, dy)` under the wrap rules.
    #[inline]
    pub fn offset(&self, flat: usize, dx: i64, dy: i64) -> usize {
        let (x, y) = self.coords(flat);
        self.wrap_flat(i64::from(x) + dx, i64::from(y) + dy)
    }

    /// The four edge-adjacent pixels in [`NEIGHBOUR_OFFSETS`] order.
    ///
    /// On degenerate grids (width or height of 1 or 2) entries may repeat or
    /// equal `flat` itself.
    #[inline]
    pub fn neighbours4(&self, flat: usize) -> [usize; 4] {
        NEIGHBOUR_OFFSETS.map(|(dx, dy)| self.offset(flat, dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_grid() {
        assert_eq!(
            GridTopology::new(0, 4),
            Err(RegionError::InvalidGrid {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn pole_reflection_needs_even_width() {
        assert_eq!(
            GridTopology::new(5, 3),
            Err(RegionError::InvalidGrid {
                width: 5,
                height: 3
            })
        );
        assert!(GridTopology::new(1, 3).is_ok());
        assert!(GridTopology::with_wrap(5, 3, VerticalWrap::Torus).is_ok());
    }

    #[test]
    fn flat_round_trips_coords() {
        let g = GridTopology::with_wrap(7, 5, VerticalWrap::Torus).unwrap();
        for flat in 0..g.pixel_count() {
            let (x, y) = g.coords(flat);
            assert_eq!(g.flat(x, y), flat);
        }
        assert!(g.try_flat(7, 0).is_err());
    }

    #[test]
    fn x_wraps_modulo_width() {
        let g = GridTopology::new(8, 4).unwrap();
        assert_eq!(g.wrap(-1, 2), (7, 2));
        assert_eq!(g.wrap(8, 2), (0, 2));
        assert_eq!(g.wrap(-17, 0), (7, 0));
    }

    #[test]
    fn y_reflects_across_poles_with_half_turn() {
        let g = GridTopology::new(8, 4).unwrap();
        // North pole: row -1 mirrors to row 0, longitude shifted by 4.
        assert_eq!(g.wrap(1, -1), (5, 0));
        assert_eq!(g.wrap(6, -2), (2, 1));
        // South pole.
        assert_eq!(g.wrap(1, 4), (5, 3));
        assert_eq!(g.wrap(1, 5), (5, 2));
        // Crossing both poles is a full turn.
        assert_eq!(g.wrap(1, 8), (1, 0));
    }

    #[test]
    fn torus_wraps_rows() {
        let g = GridTopology::with_wrap(3, 3, VerticalWrap::Torus).unwrap();
        assert_eq!(g.wrap(0, -1), (0, 2));
        assert_eq!(g.wrap(2, 3), (2, 0));
    }

    #[test]
    fn neighbours_are_symmetric() {
        let shapes = [(6, 4), (1, 3), (2, 2), (5, 3), (7, 1)];
        for vertical in [VerticalWrap::PoleReflect, VerticalWrap::Torus] {
            for (w, h) in shapes {
                let Ok(g) = GridTopology::with_wrap(w, h, vertical) else {
                    continue;
                };
                for a in 0..g.pixel_count() {
                    for b in g.neighbours4(a) {
                        assert!(
                            g.neighbours4(b).contains(&a),
                            "{a} -> {b} not mirrored on {w}x{h} under {vertical:?}"
                        );
                    }
                }
            }
        }
    }
}
