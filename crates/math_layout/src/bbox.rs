//! Bounding boxes and placement offsets
//!
//! All box dimensions are in ems of the box's own font size. A box's
//! `rscale` converts it to the units of its parent, which is what every
//! combination helper applies.

use serde::{Deserialize, Serialize};

/// A position relative to a parent's origin (x to the right, y up from the baseline)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// The bounding box of one wrapper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Width
    pub w: f64,
    /// Height above the baseline
    pub h: f64,
    /// Depth below the baseline
    pub d: f64,
    /// Top overshoot
    pub t: f64,
    /// Bottom overshoot
    pub b: f64,
    /// Left bearing
    pub l: f64,
    /// Right bearing
    pub r: f64,
    /// Italic correction of the last glyph
    pub ic: f64,
    /// Absolute scale relative to the surrounding text
    pub scale: f64,
    /// Scale relative to the parent wrapper
    pub rscale: f64,
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BBox {
    /// An empty box at unit scale
    pub fn empty() -> Self {
        Self {
            w: 0.0,
            h: 0.0,
            d: 0.0,
            t: 0.0,
            b: 0.0,
            l: 0.0,
            r: 0.0,
            ic: 0.0,
            scale: 1.0,
            rscale: 1.0,
        }
    }

    /// A box with the given width, height and depth at unit scale
    pub fn from_whd(w: f64, h: f64, d: f64) -> Self {
        Self {
            w,
            h,
            d,
            ..Self::empty()
        }
    }

    /// Reset the dimensions, keeping the scale factors
    pub fn clear(&mut self) {
        *self = Self {
            scale: self.scale,
            rscale: self.rscale,
            ..Self::empty()
        };
    }

    /// The box as seen from the parent: dimensions multiplied by `rscale`
    pub fn outer(&self) -> BBox {
        let rs = self.rscale;
        BBox {
            w: self.w * rs,
            h: self.h * rs,
            d: self.d * rs,
            t: self.t * rs,
            b: self.b * rs,
            l: self.l * rs,
            r: self.r * rs,
            ic: self.ic * rs,
            scale: self.scale,
            rscale: 1.0,
        }
    }

    /// Full advance width including bearings, in parent units
    pub fn advance(&self) -> f64 {
        (self.w + self.l + self.r) * self.rscale
    }

    /// Place a child box at `(x, y)` and grow this box to contain it
    pub fn combine(&mut self, cbox: &BBox, x: f64, y: f64) {
        let rs = cbox.rscale;
        let w = x + rs * (cbox.w + cbox.l + cbox.r);
        let h = y + rs * cbox.h;
        let d = rs * cbox.d - y;
        if w > self.w {
            self.w = w;
        }
        if h > self.h {
            self.h = h;
        }
        if d > self.d {
            self.d = d;
        }
    }

    /// Place a child box at the current right edge on the baseline
    pub fn append(&mut self, cbox: &BBox) {
        let rs = cbox.rscale;
        self.w += rs * (cbox.w + cbox.l + cbox.r);
        self.h = self.h.max(rs * cbox.h);
        self.d = self.d.max(rs * cbox.d);
        self.t = self.t.max(rs * cbox.t);
        self.b = self.b.max(rs * cbox.b);
        self.ic = rs * cbox.ic;
    }

    /// Total vertical extent
    pub fn height_and_depth(&self) -> f64 {
        self.h + self.d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_accumulates_width() {
        let mut bbox = BBox::empty();
        bbox.append(&BBox::from_whd(0.5, 0.7, 0.2));
        let mut small = BBox::from_whd(1.0, 1.0, 0.0);
        small.rscale = 0.5;
        bbox.append(&small);
        assert!((bbox.w - 1.0).abs() < 1e-9);
        assert!((bbox.h - 0.7).abs() < 1e-9);
        assert!((bbox.d - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_combine_with_offset() {
        let mut bbox = BBox::from_whd(1.0, 0.5, 0.1);
        bbox.combine(&BBox::from_whd(0.4, 0.3, 0.1), 1.0, 0.6);
        assert!((bbox.w - 1.4).abs() < 1e-9);
        assert!((bbox.h - 0.9).abs() < 1e-9);
        // the raised child does not reach below the baseline
        assert!((bbox.d - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_outer_applies_rscale() {
        let mut bbox = BBox::from_whd(2.0, 1.0, 0.5);
        bbox.rscale = 0.7;
        let outer = bbox.outer();
        assert!((outer.w - 1.4).abs() < 1e-9);
        assert_eq!(outer.rscale, 1.0);
    }

    #[test]
    fn test_clear_keeps_scale() {
        let mut bbox = BBox::from_whd(2.0, 1.0, 0.5);
        bbox.scale = 0.5;
        bbox.rscale = 0.5;
        bbox.clear();
        assert_eq!(bbox.w, 0.0);
        assert_eq!(bbox.scale, 0.5);
    }
}
