use anyhow::{Context, Result, anyhow};
use image::{Rgb, RgbImage};
use rusttype::{Font, Scale, point};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const FONT_CANDIDATES: &[&str] = &[
    "DejaVuSans-Bold", "Arial Bold", "Arial", "Helvetica", "DejaVuSans", "LiberationSans-Bold", "LiberationSans", "NotoSans-Bold", "NotoSans-Regular",
];

const HEADER: [&str; 5] = ["B", "I", "N", "G", "O"];

fn font_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if cfg!(target_os = "macos") {
        dirs.extend([PathBuf::from("/System/Library/Fonts"), PathBuf::from("/Library/Fonts")]);
        if let Some(home) = dirs_next::home_dir() { dirs.push(home.join("Library/Fonts")); }
    } else if cfg!(target_os = "windows") {
        if let Some(win) = std::env::var_os("WINDIR") { dirs.push(PathBuf::from(win).join("Fonts")); }
        dirs.push(PathBuf::from("C:/Windows/Fonts"));
    } else {
        dirs.extend([PathBuf::from("/usr/share/fonts"), PathBuf::from("/usr/local/share/fonts")]);
        if let Some(home) = dirs_next::home_dir() {
            dirs.push(home.join(".fonts"));
            dirs.push(home.join(".local/share/fonts"));
        }
    }
    dirs
}

fn find_system_font() -> Option<Font<'static>> {
    // Explicit override for machines with unusual font layouts
    if let Ok(path) = std::env::var("BINGO_FONT_PATH") {
        if let Some(font) = fs::read(&path).ok().and_then(Font::try_from_vec) { return Some(font); }
        tracing::warn!(path = %path, "BINGO_FONT_PATH is not a usable font");
    }

    let font_files: Vec<PathBuf> = font_search_dirs()
        .into_iter()
        .filter(|dir| dir.exists())
        .flat_map(|dir| walkdir::WalkDir::new(dir).follow_links(true).into_iter().filter_map(|e| e.ok()))
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|e| e.to_str()).is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf"))
        })
        .collect();

    for &cand in FONT_CANDIDATES {
        let hit = font_files.iter().find(|p| p.file_stem().and_then(|s| s.to_str()).is_some_and(|s| s.eq_ignore_ascii_case(cand)));
        if let Some(font) = hit.and_then(|p| fs::read(p).ok()).and_then(Font::try_from_vec) {
            tracing::debug!(font = cand, "using candidate font");
            return Some(font);
        }
    }

    // The board only needs digits and the BINGO letters.
    font_files.iter().find_map(|path| {
        let font = fs::read(path).ok().and_then(Font::try_from_vec)?;
        let covers = "0123456789BINGO".chars().all(|c| font.glyph(c).id().0 != 0);
        covers.then_some(font)
    })
}

struct TextPainter {
    font: Font<'static>,
    scale: Scale,
}

impl TextPainter {
    fn new(font: Font<'static>, px: f32) -> Self {
        Self { font, scale: Scale::uniform(px) }
    }

    fn text_width(&self, text: &str) -> f32 {
        self.font
            .layout(text, self.scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw_centered(&self, img: &mut RgbImage, text: &str, left: u32, top: u32, size: u32, color: Rgb<u8>) {
        let v = self.font.v_metrics(self.scale);
        let x = left as f32 + (size as f32 - self.text_width(text)) / 2.0;
        let baseline = top as f32 + (size as f32 + v.ascent + v.descent) / 2.0;
        for glyph in self.font.layout(text, self.scale, point(x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else { continue };
            glyph.draw(|gx, gy, a| {
                if a < 0.05 { return; }
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px >= 0 && py >= 0 && (px as u32) < img.width() && (py as u32) < img.height() {
                    let dst = img.get_pixel_mut(px as u32, py as u32);
                    for i in 0..3 { dst[i] = ((dst[i] as f32) * (1.0 - a) + (color[i] as f32) * a) as u8; }
                }
            });
        }
    }
}

fn fill_rect(img: &mut RgbImage, left: u32, top: u32, size: u32, color: Rgb<u8>) {
    for y in top..(top + size).min(img.height()) {
        for x in left..(left + size).min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Column/row of `n` on the board. The pool is split evenly over B-I-N-G-O,
/// so with 75 numbers column B holds 1..=15, I holds 16..=30 and so on.
pub fn cell_of(n: u32, max_number: u32) -> (u32, u32) {
    let per_col = max_number.div_ceil(5).max(1);
    ((n - 1) / per_col, (n - 1) % per_col)
}

/// Renders the called-number board. Drawn numbers are filled, and the most
/// recent one (`last`) is highlighted.
pub fn render_called_board(max_number: u32, drawn: &[u32], last: Option<u32>, path: &Path) -> Result<()> {
    let per_col = max_number.div_ceil(5).max(1);

    let cell_px = 56u32;
    let padding = 20u32;
    let grid_w = 5 * cell_px;
    let grid_h = (per_col + 1) * cell_px; // header row on top
    let img_w = grid_w + padding * 2;
    let img_h = grid_h + padding * 2;

    let bg = Rgb([245, 245, 245]);
    let line = Rgb([30, 30, 30]);
    let header_bg = Rgb([40, 70, 160]);
    let called_bg = Rgb([250, 200, 60]);
    let last_bg = Rgb([220, 60, 60]);
    let txt = Rgb([20, 20, 20]);
    let txt_light = Rgb([250, 250, 250]);

    let mut img = RgbImage::from_pixel(img_w, img_h, bg);

    for col in 0..5 {
        fill_rect(&mut img, padding + col * cell_px, padding, cell_px, header_bg);
    }
    for &n in drawn.iter().filter(|&&n| (1..=max_number).contains(&n)) {
        let (col, row) = cell_of(n, max_number);
        let color = if Some(n) == last { last_bg } else { called_bg };
        fill_rect(&mut img, padding + col * cell_px, padding + (row + 1) * cell_px, cell_px, color);
    }

    for i in 0..=5 {
        let x = padding + i * cell_px;
        if x < img_w { for y in padding..(padding + grid_h) { img.put_pixel(x, y, line); } }
    }
    for i in 0..=(per_col + 1) {
        let y = padding + i * cell_px;
        if y < img_h { for x in padding..(padding + grid_w) { img.put_pixel(x, y, line); } }
    }

    let font = find_system_font().ok_or_else(|| anyhow!("no system font found for rendering"))?;
    let painter = TextPainter::new(font, 24.0);

    for (col, letter) in HEADER.iter().enumerate() {
        painter.draw_centered(&mut img, letter, padding + col as u32 * cell_px, padding, cell_px, txt_light);
    }
    for n in 1..=max_number {
        let (col, row) = cell_of(n, max_number);
        let color = if Some(n) == last { txt_light } else { txt };
        painter.draw_centered(&mut img, &n.to_string(), padding + col * cell_px, padding + (row + 1) * cell_px, cell_px, color);
    }

    let mut file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    img.write_to(&mut file, image::ImageFormat::Png)?;
    tracing::info!(path = %path.display(), called = drawn.len(), "board rendered");
    Ok(())
}
