//! Shape rasterizers.
//!
//! Every primitive clips against the current width and height before it opens
//! an address window, so off-screen geometry is silently dropped. Coordinates
//! are signed: shapes may start left of or above the visible area. Internally
//! geometry is carried in `i64` so no input can overflow, and the walkers only
//! step through the part of a shape that can reach the screen.

use crate::interface::Interface;
use crate::{Error, ST7735};

/// Corner bits for [`ST7735::draw_circle_helper`].
pub mod corner {
    pub const TOP_LEFT: u8 = 1;
    pub const TOP_RIGHT: u8 = 2;
    pub const BOTTOM_LEFT: u8 = 4;
    pub const BOTTOM_RIGHT: u8 = 8;
}

/// Half bits for [`ST7735::fill_circle_helper`].
pub mod side {
    pub const RIGHT: u8 = 1;
    pub const LEFT: u8 = 2;
}

/// Midpoint circle stepper. Yields `(x, y)` for the first octant, starting
/// one step past the axis points.
struct Octant {
    f: i64,
    ddf_x: i64,
    ddf_y: i64,
    x: i64,
    y: i64,
}

impl Octant {
    fn new(r: i64) -> Self {
        Octant {
            f: 1 - r,
            ddf_x: 1,
            ddf_y: -2 * r,
            x: 0,
            y: r,
        }
    }

    /// A stepper whose first point has a column offset of at most `first`.
    ///
    /// While `x + 1 <= y` the stepper's row is the smallest `y` with
    /// `y * (y + 1) >= r^2 - x^2`, so its state can be rebuilt directly.
    fn resume(r: i64, first: i64) -> Self {
        let mut x = first.min(diagonal(r)) - 1;
        while x > 0 {
            let y = row_at(r, x);
            if x < y {
                return Octant {
                    f: (x + 1) * (x + 1) - (r * r - y * y + y),
                    ddf_x: 2 * x + 1,
                    ddf_y: -2 * y,
                    x,
                    y,
                };
            }
            x -= 1;
        }
        Octant::new(r)
    }
}

impl Iterator for Octant {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<(i64, i64)> {
        if self.x >= self.y {
            return None;
        }
        if self.f >= 0 {
            self.y -= 1;
            self.ddf_y += 2;
            self.f += self.ddf_y;
        }
        self.x += 1;
        self.ddf_x += 2;
        self.f += self.ddf_x;
        Some((self.x, self.y))
    }
}

/// Upper bound of the octant's column offsets.
fn diagonal(r: i64) -> i64 {
    ((r * r / 2) as u64).isqrt() as i64 + 2
}

/// Octant row offset at column offset `x`, for `0 <= x <= r`.
fn row_at(r: i64, x: i64) -> i64 {
    let s = (r * r - x * x).max(0);
    let t = (s as u64).isqrt() as i64;
    if t * (t + 1) >= s { t } else { t + 1 }
}

/// First column offset whose octant row offset is at most `limit`.
fn column_where_row_within(r: i64, limit: i64) -> i64 {
    if limit >= r {
        0
    } else if limit < 0 {
        i64::MAX
    } else {
        let need = (r * r - limit * (limit + 1)) as u64;
        let t = need.isqrt();
        (if t * t == need { t } else { t + 1 }) as i64
    }
}

/// Distance from `c` to the nearest and to the farthest index in `0..len`.
fn reach(c: i64, len: u16) -> (i64, i64) {
    let last = i64::from(len) - 1;
    let near = if c < 0 {
        -c
    } else if c > last {
        c - last
    } else {
        0
    };
    (near, c.abs().max((c - last).abs()))
}

/// Octant columns `from..=to` whose points can land on screen, for points
/// that move along an axis with reach `along` by the column offset and along
/// an axis with reach `across` by the row offset. Row-derived bounds are
/// padded by two steps.
fn window(r: i64, along: (i64, i64), across: (i64, i64)) -> (i64, i64) {
    let from = along
        .0
        .max(column_where_row_within(r, across.1).saturating_sub(2));
    let to = along
        .1
        .min(column_where_row_within(r, across.0 - 1).saturating_add(2));
    (from, to)
}

fn normalize(a: i32, b: i32) -> (i64, i64) {
    let (a, b) = (i64::from(a), i64::from(b));
    if a > b { (b, a) } else { (a, b) }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl<DI> ST7735<DI>
where
    DI: Interface,
{
    /// Clips a rectangle to the screen. Returns `(x, y, w, h)` of the
    /// visible part, or `None` if nothing is left.
    pub(crate) fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(u16, u16, u16, u16)> {
        self.clip_wide(i64::from(x), i64::from(y), i64::from(w), i64::from(h))
    }

    fn clip_wide(&self, x: i64, y: i64, w: i64, h: i64) -> Option<(u16, u16, u16, u16)> {
        if w <= 0 || h <= 0 {
            return None;
        }
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(i64::from(self.width()));
        let y1 = y.saturating_add(h).min(i64::from(self.height()));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
    }

    fn plot(&mut self, x: i64, y: i64, color: u16) -> Result<(), Error<DI::Error>> {
        match self.clip_wide(x, y, 1, 1) {
            Some((x, y, _, _)) => {
                self.set_addr_window(x, y, x, y)?;
                self.write_pixels([color])
            }
            None => Ok(()),
        }
    }

    fn fill_area(&mut self, x: i64, y: i64, w: i64, h: i64, color: u16) -> Result<(), Error<DI::Error>> {
        match self.clip_wide(x, y, w, h) {
            Some((x, y, w, h)) => self.fill_window(x, y, w, h, color),
            None => Ok(()),
        }
    }

    /// Fills the whole visible area.
    pub fn fill_screen(&mut self, color: u16) -> Result<(), Error<DI::Error>> {
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));
        self.fill_area(0, 0, w, h, color)
    }

    /// Draws a single pixel. Off-screen pixels are ignored.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: u16) -> Result<(), Error<DI::Error>> {
        self.plot(i64::from(x), i64::from(y), color)
    }

    pub fn draw_fast_hline(&mut self, x: i32, y: i32, w: i32, color: u16) -> Result<(), Error<DI::Error>> {
        self.fill_area(i64::from(x), i64::from(y), i64::from(w), 1, color)
    }

    pub fn draw_fast_vline(&mut self, x: i32, y: i32, h: i32, color: u16) -> Result<(), Error<DI::Error>> {
        self.fill_area(i64::from(x), i64::from(y), 1, i64::from(h), color)
    }

    /// Fills a `w` x `h` rectangle through one address window.
    pub fn fill_rect_wh(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.fill_area(i64::from(x), i64::from(y), i64::from(w), i64::from(h), color)
    }

    pub fn draw_rect_wh(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.outline(i64::from(x), i64::from(y), i64::from(w), i64::from(h), color)
    }

    fn outline(&mut self, x: i64, y: i64, w: i64, h: i64, color: u16) -> Result<(), Error<DI::Error>> {
        self.fill_area(x, y, w, 1, color)?;
        self.fill_area(x, y + h - 1, w, 1, color)?;
        self.fill_area(x, y, 1, h, color)?;
        self.fill_area(x + w - 1, y, 1, h, color)
    }

    /// Outlines the rectangle spanned by two opposite corners, both included.
    pub fn draw_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u16) -> Result<(), Error<DI::Error>> {
        let (x0, x1) = normalize(x0, x1);
        let (y0, y1) = normalize(y0, y1);
        self.outline(x0, y0, x1 - x0 + 1, y1 - y0 + 1, color)
    }

    /// Fills the rectangle spanned by two opposite corners, both included.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u16) -> Result<(), Error<DI::Error>> {
        let (x0, x1) = normalize(x0, x1);
        let (y0, y1) = normalize(y0, y1);
        self.fill_area(x0, y0, x1 - x0 + 1, y1 - y0 + 1, color)
    }

    /// Bresenham line, endpoints included.
    ///
    /// Only the columns (rows for steep lines) inside the screen are walked;
    /// the error term is advanced to the first of them in one step, so the
    /// pixels match a walk from the first endpoint.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u16) -> Result<(), Error<DI::Error>> {
        let (mut x0, mut y0) = (i64::from(x0), i64::from(y0));
        let (mut x1, mut y1) = (i64::from(x1), i64::from(y1));
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            core::mem::swap(&mut x0, &mut y0);
            core::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            core::mem::swap(&mut x0, &mut x1);
            core::mem::swap(&mut y0, &mut y1);
        }
        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };

        let major = i64::from(if steep { self.height() } else { self.width() });
        let first = x0.max(0);
        let last = x1.min(major - 1);
        if first > last {
            return Ok(());
        }
        let skipped = i128::from(first - x0);
        let (dx_w, dy_w, half) = (i128::from(dx), i128::from(dy), i128::from(dx / 2));
        // Row steps taken before `first`: the error stays in `0..dx`.
        let steps = if dx == 0 {
            0
        } else {
            (skipped * dy_w - half + dx_w - 1) / dx_w
        };
        let mut err = (half + steps * dx_w - skipped * dy_w) as i64;
        let mut y = y0 + ystep * steps as i64;
        for x in first..=last {
            if steep {
                self.plot(y, x, color)?;
            } else {
                self.plot(x, y, color)?;
            }
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
        Ok(())
    }

    fn misses_screen(&self, left: i64, top: i64, right: i64, bottom: i64) -> bool {
        right < 0 || bottom < 0 || left >= i64::from(self.width()) || top >= i64::from(self.height())
    }

    pub fn draw_circle(&mut self, x0: i32, y0: i32, r: i32, color: u16) -> Result<(), Error<DI::Error>> {
        let (x0, y0, r) = (i64::from(x0), i64::from(y0), i64::from(r));
        if r < 0 || self.misses_screen(x0 - r, y0 - r, x0 + r, y0 + r) {
            return Ok(());
        }
        self.plot(x0, y0 + r, color)?;
        self.plot(x0, y0 - r, color)?;
        self.plot(x0 + r, y0, color)?;
        self.plot(x0 - r, y0, color)?;
        self.arc(
            x0,
            y0,
            r,
            corner::TOP_LEFT | corner::TOP_RIGHT | corner::BOTTOM_LEFT | corner::BOTTOM_RIGHT,
            color,
        )
    }

    pub fn fill_circle(&mut self, x0: i32, y0: i32, r: i32, color: u16) -> Result<(), Error<DI::Error>> {
        let (x0, y0, r) = (i64::from(x0), i64::from(y0), i64::from(r));
        if r < 0 || self.misses_screen(x0 - r, y0 - r, x0 + r, y0 + r) {
            return Ok(());
        }
        self.fill_area(x0, y0 - r, 1, 2 * r + 1, color)?;
        self.arc_fill(x0, y0, r, side::LEFT | side::RIGHT, 0, color)
    }

    /// Draws the quarter arcs selected by `corners` (see [`corner`]).
    pub fn draw_circle_helper(
        &mut self,
        x0: i32,
        y0: i32,
        r: i32,
        corners: u8,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.arc(i64::from(x0), i64::from(y0), i64::from(r), corners, color)
    }

    fn arc(&mut self, x0: i64, y0: i64, r: i64, corners: u8, color: u16) -> Result<(), Error<DI::Error>> {
        if r <= 0 {
            return Ok(());
        }
        let reach_x = reach(x0, self.width());
        let reach_y = reach(y0, self.height());

        // Points offset by the column step horizontally.
        let (from, to) = window(r, reach_x, reach_y);
        if from <= to {
            for (x, y) in Octant::resume(r, from) {
                if x > to {
                    break;
                }
                if x < from {
                    continue;
                }
                if corners & corner::TOP_LEFT != 0 {
                    self.plot(x0 - x, y0 - y, color)?;
                }
                if corners & corner::TOP_RIGHT != 0 {
                    self.plot(x0 + x, y0 - y, color)?;
                }
                if corners & corner::BOTTOM_LEFT != 0 {
                    self.plot(x0 - x, y0 + y, color)?;
                }
                if corners & corner::BOTTOM_RIGHT != 0 {
                    self.plot(x0 + x, y0 + y, color)?;
                }
            }
        }

        // Points offset by the column step vertically.
        let (from, to) = window(r, reach_y, reach_x);
        if from <= to {
            for (x, y) in Octant::resume(r, from) {
                if x > to {
                    break;
                }
                if x < from {
                    continue;
                }
                if corners & corner::TOP_LEFT != 0 {
                    self.plot(x0 - y, y0 - x, color)?;
                }
                if corners & corner::TOP_RIGHT != 0 {
                    self.plot(x0 + y, y0 - x, color)?;
                }
                if corners & corner::BOTTOM_LEFT != 0 {
                    self.plot(x0 - y, y0 + x, color)?;
                }
                if corners & corner::BOTTOM_RIGHT != 0 {
                    self.plot(x0 + y, y0 + x, color)?;
                }
            }
        }
        Ok(())
    }

    /// Fills the circle halves selected by `sides` (see [`side`]) with
    /// vertical spans, each stretched by `delta` rows.
    pub fn fill_circle_helper(
        &mut self,
        x0: i32,
        y0: i32,
        r: i32,
        sides: u8,
        delta: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.arc_fill(
            i64::from(x0),
            i64::from(y0),
            i64::from(r),
            sides,
            i64::from(delta),
            color,
        )
    }

    fn arc_fill(
        &mut self,
        x0: i64,
        y0: i64,
        r: i64,
        sides: u8,
        delta: i64,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        if r <= 0 {
            return Ok(());
        }
        let (near, far) = reach(x0, self.width());

        // Spans at `x0 +- x`.
        for (x, y) in Octant::resume(r, near) {
            if x > far {
                break;
            }
            if x < near {
                continue;
            }
            if sides & side::RIGHT != 0 {
                self.fill_area(x0 + x, y0 - y, 1, 2 * y + 1 + delta, color)?;
            }
            if sides & side::LEFT != 0 {
                self.fill_area(x0 - x, y0 - y, 1, 2 * y + 1 + delta, color)?;
            }
        }

        // Spans at `x0 +- y`.
        let from = column_where_row_within(r, far).saturating_sub(2);
        let to = column_where_row_within(r, near - 1).saturating_add(2);
        if from <= to {
            for (x, y) in Octant::resume(r, from) {
                if x > to {
                    break;
                }
                if x < from {
                    continue;
                }
                if sides & side::RIGHT != 0 {
                    self.fill_area(x0 + y, y0 - x, 1, 2 * x + 1 + delta, color)?;
                }
                if sides & side::LEFT != 0 {
                    self.fill_area(x0 - y, y0 - x, 1, 2 * x + 1 + delta, color)?;
                }
            }
        }
        Ok(())
    }

    fn check_radius(w: i64, h: i64, r: i64) -> Result<(), Error<DI::Error>> {
        if r < 0 || 2 * r > w.min(h) {
            log::warn!("corner radius {} does not fit {}x{}", r, w, h);
            return Err(Error::InvalidRadius {
                radius: saturate(r),
                width: saturate(w),
                height: saturate(h),
            });
        }
        Ok(())
    }

    /// Outlines a rectangle with rounded corners.
    ///
    /// Fails with [`Error::InvalidRadius`] unless `0 <= 2 * r <= min(w, h)`.
    pub fn draw_round_rect_wh(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        r: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.round_outline(
            i64::from(x),
            i64::from(y),
            i64::from(w),
            i64::from(h),
            i64::from(r),
            color,
        )
    }

    fn round_outline(&mut self, x: i64, y: i64, w: i64, h: i64, r: i64, color: u16) -> Result<(), Error<DI::Error>> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        Self::check_radius(w, h, r)?;
        self.fill_area(x + r, y, w - 2 * r, 1, color)?;
        self.fill_area(x + r, y + h - 1, w - 2 * r, 1, color)?;
        self.fill_area(x, y + r, 1, h - 2 * r, color)?;
        self.fill_area(x + w - 1, y + r, 1, h - 2 * r, color)?;
        self.arc(x + r, y + r, r, corner::TOP_LEFT, color)?;
        self.arc(x + w - r - 1, y + r, r, corner::TOP_RIGHT, color)?;
        self.arc(x + w - r - 1, y + h - r - 1, r, corner::BOTTOM_RIGHT, color)?;
        self.arc(x + r, y + h - r - 1, r, corner::BOTTOM_LEFT, color)
    }

    /// Fills a rectangle with rounded corners.
    ///
    /// Fails with [`Error::InvalidRadius`] unless `0 <= 2 * r <= min(w, h)`.
    pub fn fill_round_rect_wh(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        r: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.round_fill(
            i64::from(x),
            i64::from(y),
            i64::from(w),
            i64::from(h),
            i64::from(r),
            color,
        )
    }

    fn round_fill(&mut self, x: i64, y: i64, w: i64, h: i64, r: i64, color: u16) -> Result<(), Error<DI::Error>> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        Self::check_radius(w, h, r)?;
        self.fill_area(x + r, y, w - 2 * r, h, color)?;
        self.arc_fill(x + w - r - 1, y + r, r, side::RIGHT, h - 2 * r - 1, color)?;
        self.arc_fill(x + r, y + r, r, side::LEFT, h - 2 * r - 1, color)
    }

    pub fn draw_round_rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        r: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        let (x0, x1) = normalize(x0, x1);
        let (y0, y1) = normalize(y0, y1);
        self.round_outline(x0, y0, x1 - x0 + 1, y1 - y0 + 1, i64::from(r), color)
    }

    pub fn fill_round_rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        r: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        let (x0, x1) = normalize(x0, x1);
        let (y0, y1) = normalize(y0, y1);
        self.round_fill(x0, y0, x1 - x0 + 1, y1 - y0 + 1, i64::from(r), color)
    }

    /// Outlines a triangle with three lines, in vertex order.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.draw_line(x0, y0, x1, y1, color)?;
        self.draw_line(x1, y1, x2, y2, color)?;
        self.draw_line(x2, y2, x0, y0, color)
    }

    /// Scanline triangle fill: a flat-bottom upper half and a flat-top lower
    /// half, edges interpolated with integer running sums. Rows above the
    /// screen are skipped by starting the sums at the first visible row.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        let mut v = [(x0, y0), (x1, y1), (x2, y2)].map(|(x, y)| (i64::from(x), i64::from(y)));
        v.sort_by_key(|&(_, y)| y);
        let [(x0, y0), (x1, y1), (x2, y2)] = v;

        let left = x0.min(x1).min(x2);
        let right = x0.max(x1).max(x2);
        if self.misses_screen(left, y0, right, y2) {
            return Ok(());
        }
        if y0 == y2 {
            return self.fill_area(left, y0, right - left + 1, 1, color);
        }

        let bottom = i64::from(self.height()) - 1;
        let (dx01, dy01) = (i128::from(x1 - x0), i128::from(y1 - y0));
        let (dx02, dy02) = (i128::from(x2 - x0), i128::from(y2 - y0));
        let (dx12, dy12) = (i128::from(x2 - x1), i128::from(y2 - y1));

        // Include the middle row here only when the lower half is empty.
        let last = if y1 == y2 { y1 } else { y1 - 1 };
        let mut y = y0.max(0);
        let mut sa = dx01 * i128::from(y - y0);
        let mut sb = dx02 * i128::from(y - y0);
        while y <= last.min(bottom) {
            let a = x0 + (sa / dy01) as i64;
            let b = x0 + (sb / dy02) as i64;
            sa += dx01;
            sb += dx02;
            let (a, b) = if a > b { (b, a) } else { (a, b) };
            self.fill_area(a, y, b - a + 1, 1, color)?;
            y += 1;
        }

        y = (last + 1).max(0);
        sa = dx12 * i128::from(y - y1);
        sb = dx02 * i128::from(y - y0);
        while y <= y2.min(bottom) {
            let a = x1 + (sa / dy12) as i64;
            let b = x0 + (sb / dy02) as i64;
            sa += dx12;
            sb += dx02;
            let (a, b) = if a > b { (b, a) } else { (a, b) };
            self.fill_area(a, y, b - a + 1, 1, color)?;
            y += 1;
        }
        Ok(())
    }
}
