use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eframe::egui::{self, ColorImage, Rect, TextureHandle, TextureOptions, Vec2};
use tracing::warn;

/// Decoded background textures keyed by path. Failed decodes are remembered
/// so a broken image is reported once rather than every frame.
#[derive(Default)]
pub(crate) struct BackgroundCache {
    textures: HashMap<PathBuf, Option<TextureHandle>>,
}

impl BackgroundCache {
    pub(crate) fn texture(&mut self, ctx: &egui::Context, path: &Path) -> Option<TextureHandle> {
        self.textures
            .entry(path.to_path_buf())
            .or_insert_with(|| match decode_image(path) {
                Ok(image) => Some(ctx.load_texture(
                    format!("background:{}", path.display()),
                    image,
                    TextureOptions::LINEAR,
                )),
                Err(err) => {
                    warn!("Background image {} unavailable: {err}", path.display());
                    None
                }
            })
            .clone()
    }

    /// Paint `path` over `rect`, cropped to fill it, with a legibility scrim.
    pub(crate) fn paint_cover(
        &mut self,
        ui: &egui::Ui,
        path: Option<&Path>,
        rect: Rect,
        corner_radius: u8,
    ) -> bool {
        let Some(texture) = path.and_then(|path| self.texture(ui.ctx(), path)) else {
            return false;
        };
        let uv = cover_uv(texture.size_vec2(), rect.size());
        let painter = ui.painter_at(rect);
        egui::Image::new((texture.id(), rect.size()))
            .uv(uv)
            .corner_radius(corner_radius)
            .paint_at(ui, rect);
        painter.rect_filled(rect, corner_radius, super::style::image_scrim());
        true
    }
}

fn decode_image(path: &Path) -> Result<ColorImage, image::ImageError> {
    let image = image::open(path)?.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

/// UV window that scales an image to cover `target` while keeping its aspect ratio.
pub(crate) fn cover_uv(image: Vec2, target: Vec2) -> Rect {
    let full = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    if image.x <= 0.0 || image.y <= 0.0 || target.x <= 0.0 || target.y <= 0.0 {
        return full;
    }
    let image_aspect = image.x / image.y;
    let target_aspect = target.x / target.y;
    if image_aspect > target_aspect {
        let visible = target_aspect / image_aspect;
        let inset = (1.0 - visible) / 2.0;
        Rect::from_min_max(egui::pos2(inset, 0.0), egui::pos2(1.0 - inset, 1.0))
    } else {
        let visible = image_aspect / target_aspect;
        let inset = (1.0 - visible) / 2.0;
        Rect::from_min_max(egui::pos2(0.0, inset), egui::pos2(1.0, 1.0 - inset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn wide_image_crops_sides() {
        let uv = cover_uv(egui::vec2(200.0, 100.0), egui::vec2(100.0, 100.0));
        assert!(approx(uv.min.x, 0.25) && approx(uv.max.x, 0.75));
        assert!(approx(uv.min.y, 0.0) && approx(uv.max.y, 1.0));
    }

    #[test]
    fn tall_image_crops_top_and_bottom() {
        let uv = cover_uv(egui::vec2(100.0, 400.0), egui::vec2(100.0, 100.0));
        assert!(approx(uv.min.y, 0.375) && approx(uv.max.y, 0.625));
        assert!(approx(uv.min.x, 0.0) && approx(uv.max.x, 1.0));
    }

    #[test]
    fn degenerate_sizes_use_whole_image() {
        let uv = cover_uv(egui::vec2(0.0, 10.0), egui::vec2(100.0, 100.0));
        assert_eq!(uv, Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)));
    }

    #[test]
    fn decode_reads_png_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("bg.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&png)
            .unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!(decoded.size, [3, 2]);

        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"not an image").unwrap();
        assert!(decode_image(&junk).is_err());
    }
}
