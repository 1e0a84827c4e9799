use eframe::egui;

// 0=black, 1=red, 2=yellow, 3=green, 4=cyan, 5=blue, 6=magenta, 7=white
pub const PALETTE: [(u8, u8, u8); 8] = [
    (0x20, 0x20, 0x20),
    (0x7f, 0x00, 0x00),
    (0x7f, 0x7f, 0x00),
    (0x00, 0x7f, 0x00),
    (0x00, 0x7f, 0x7f),
    (0x00, 0x00, 0x7f),
    (0x7f, 0x00, 0x7f),
    (0x7f, 0x7f, 0x7f),
];

pub const DEFAULT_THICKNESS: i32 = 5;
pub const FONT_SIZE: f32 = 40.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Material {
    #[default]
    Transparent,
    Translucent,
    Opaque,
}

impl Material {
    pub fn alpha(self) -> u8 {
        match self {
            Material::Transparent => 0x00,
            Material::Translucent => 0x7f,
            Material::Opaque => 0xff,
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            Material::Transparent => Material::Translucent,
            Material::Translucent => Material::Opaque,
            Material::Opaque => Material::Transparent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub color: usize,
    pub material: Material,
    pub thickness: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: 3,
            material: Material::Transparent,
            thickness: DEFAULT_THICKNESS,
        }
    }
}

impl Style {
    /// Fill color: brightened palette entry, alpha from the material.
    pub fn body_color(&self) -> egui::Color32 {
        let (r, g, b) = lighten(self.color);
        egui::Color32::from_rgba_unmultiplied(r, g, b, self.material.alpha())
    }

    /// Border color: always full alpha, brightened only for transparent fills.
    pub fn outline_color(&self) -> egui::Color32 {
        let (r, g, b) = if self.material == Material::Transparent {
            lighten(self.color)
        } else {
            PALETTE[self.color]
        };
        egui::Color32::from_rgb(r, g, b)
    }

    /// Arrow strokes and glyph text: brightened, always full alpha.
    pub fn solid_color(&self) -> egui::Color32 {
        let (r, g, b) = lighten(self.color);
        egui::Color32::from_rgb(r, g, b)
    }
}

// Palette index 0 stays dark; every other entry gets 0x80 or-ed per channel.
fn lighten(index: usize) -> (u8, u8, u8) {
    let (r, g, b) = PALETTE[index];
    if index == 0 {
        (r, g, b)
    } else {
        (r | 0x80, g | 0x80, b | 0x80)
    }
}

pub trait TextMetrics {
    fn measure(&self, text: &str) -> (i32, i32);
}

/// Character-cell approximation of the 40 px editor font.
pub struct CharMetrics;

impl TextMetrics for CharMetrics {
    fn measure(&self, text: &str) -> (i32, i32) {
        let w = (text.chars().count() as f32 * FONT_SIZE * 0.6) as i32;
        let h = (FONT_SIZE * 1.2) as i32;
        (w, h)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub style: Style,
    pub kind: ShapeKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    Rect { x: i32, y: i32, w: i32, h: i32 },
    Ellipse { x: i32, y: i32, rx: i32, ry: i32 },
    Arrow { x: i32, y: i32, dx: i32, dy: i32 },
    Grid { x: i32, y: i32, w: i32, h: i32 },
    Text { x: i32, y: i32, w: i32, h: i32, text: String },
    Image { x: i32, y: i32, w: i32, h: i32, slot: usize },
}

impl Shape {
    pub fn rect(style: Style, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (x, y, w, h) = normalized(x1, y1, x2, y2);
        Self {
            style,
            kind: ShapeKind::Rect { x, y, w, h },
        }
    }

    /// Centered on the first point. A strongly dominant axis (10x) pulls the
    /// other up to match; otherwise both radii stretch by sqrt(2) so the
    /// dragged point ends up on the rim.
    pub fn ellipse(style: Style, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let mut rx = (x2 - x1).abs();
        let mut ry = (y2 - y1).abs();
        if 10 * rx < ry {
            rx = ry;
        } else if 10 * ry < rx {
            ry = rx;
        } else {
            rx = (rx as f64 * 1.414) as i32;
            ry = (ry as f64 * 1.414) as i32;
        }
        Self {
            style,
            kind: ShapeKind::Ellipse { x: x1, y: y1, rx, ry },
        }
    }

    /// A strongly dominant axis (10x) zeroes the other, snapping the arrow
    /// to horizontal or vertical.
    pub fn arrow(style: Style, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let mut dx = x2 - x1;
        let mut dy = y2 - y1;
        if 10 * dx.abs() < dy.abs() {
            dx = 0;
        } else if 10 * dy.abs() < dx.abs() {
            dy = 0;
        }
        Self {
            style,
            kind: ShapeKind::Arrow { x: x1, y: y1, dx, dy },
        }
    }

    /// Like rect, with the extent floored to whole 100x60 cells.
    pub fn grid(style: Style, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (x, y, w, h) = normalized(x1, y1, x2, y2);
        Self {
            style,
            kind: ShapeKind::Grid {
                x,
                y,
                w: w / 100 * 100,
                h: h / 60 * 60,
            },
        }
    }

    /// Anchored so the glyphs sit just above and left of the click point.
    pub fn text(style: Style, seed: char, x1: i32, y1: i32, metrics: &dyn TextMetrics) -> Self {
        let text = seed.to_string();
        let (w, h) = metrics.measure(&text);
        Self {
            style,
            kind: ShapeKind::Text {
                x: x1 - 15,
                y: y1 - h + 10,
                w,
                h,
                text,
            },
        }
    }

    pub fn image(style: Style, x1: i32, y1: i32, x2: i32, y2: i32, slot: usize) -> Self {
        let (x, y, w, h) = normalized(x1, y1, x2, y2);
        Self {
            style,
            kind: ShapeKind::Image { x, y, w, h, slot },
        }
    }

    pub fn y(&self) -> i32 {
        match &self.kind {
            ShapeKind::Rect { y, .. }
            | ShapeKind::Ellipse { y, .. }
            | ShapeKind::Arrow { y, .. }
            | ShapeKind::Grid { y, .. }
            | ShapeKind::Text { y, .. }
            | ShapeKind::Image { y, .. } => *y,
        }
    }

    pub fn restyle(&mut self, color: usize, material: Material) {
        self.style.color = color;
        self.style.material = material;
    }

    pub fn append_text(&mut self, input: &str, metrics: &dyn TextMetrics) {
        if let ShapeKind::Text { w, h, text, .. } = &mut self.kind {
            text.push_str(input);
            let (nw, nh) = metrics.measure(text);
            *w = nw;
            *h = nh;
        }
    }

    pub fn backspace_text(&mut self, metrics: &dyn TextMetrics) {
        if let ShapeKind::Text { w, h, text, .. } = &mut self.kind {
            text.pop();
            let (nw, nh) = metrics.measure(text);
            *w = nw;
            *h = nh;
        }
    }

    pub fn hit(&self, cx: i32, cy: i32) -> bool {
        let t = self.style.thickness;
        match &self.kind {
            ShapeKind::Rect { x, y, w, h } | ShapeKind::Image { x, y, w, h, .. } => {
                border_band_hit(*x, *y, *w, *h, t, cx, cy)
            }
            ShapeKind::Ellipse { x, y, rx, ry } => {
                let px = (cx - x) as f64;
                let py = (cy - y) as f64;
                let outside_inner = (px / (rx - t) as f64).hypot(py / (ry - t) as f64) >= 1.0;
                let inside_outer = (px / *rx as f64).hypot(py / *ry as f64) <= 1.0;
                outside_inner && inside_outer
            }
            ShapeKind::Arrow { x, y, dx, dy } => {
                let nom = (dy * cx - dx * cy + (x + dx) * y - (y + dy) * x).abs();
                let dist = nom as f64 / (*dy as f64).hypot(*dx as f64);
                if dist > (2 * t) as f64 {
                    return false;
                }
                let dist_ca = ((x - cx) as f64).hypot((y - cy) as f64) as i32;
                let dist_cb = ((x + dx - cx) as f64).hypot((y + dy - cy) as f64) as i32;
                let dist_ab = (*dx as f64).hypot(*dy as f64) as i32;
                dist_ca < dist_ab && dist_cb < dist_ab
            }
            ShapeKind::Grid { x, y, w, h } => {
                let xal = cx - x;
                let yal = cy - y;
                if xal < 0 || xal > w + t || yal < 0 || yal > h + t {
                    return false;
                }
                xal % 100 < t || yal % 60 < t
            }
            ShapeKind::Text { x, y, w, h, .. } => {
                cx > *x && cx < x + w && cy > *y && cy < y + h
            }
        }
    }
}

fn normalized(x1: i32, y1: i32, x2: i32, y2: i32) -> (i32, i32, i32, i32) {
    let x = x1.min(x2);
    let y = y1.min(y2);
    (x, y, (x1 - x2).abs(), (y1 - y2).abs())
}

fn border_band_hit(x: i32, y: i32, w: i32, h: i32, t: i32, cx: i32, cy: i32) -> bool {
    (cy >= y && cy <= y + t && cx >= x && cx <= x + w)
        || (cx >= x && cx <= x + t && cy >= y && cy <= y + h)
        || (cx >= x + w - t && cx <= x + w && cy >= y && cy <= y + h)
        || (cy >= y + h - t && cy <= y + h && cx >= x && cx <= x + w)
}
