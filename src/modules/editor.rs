use crate::modules::filters;
use crate::modules::history::{
    self, EditHistory, Edits,
};
use crate::style::{self, ColorPalette, ThemeMode};
use eframe::egui;
use image::DynamicImage;
use std::sync::{Arc, Mutex};
use std::thread;

const JPEG_QUALITY: u8 = 90;
const PREVIEW_MAX: f32 = 440.0;

// One modal editing session over a single generated logo. The history lives
// only as long as the session; closing the editor discards it.
pub struct EditorSession {
    image: DynamicImage,
    index: usize,
    edits: Edits,
    history: EditHistory,

    texture: Option<egui::TextureId>,
    rendered_edits: Option<Edits>,
    is_rendering: bool,
    pending_preview: Arc<Mutex<Option<(Edits, DynamicImage)>>>,
    status: Option<String>,
}

impl EditorSession {
    pub fn open(jpeg_bytes: &[u8], index: usize) -> Result<Self, String> {
        let image: DynamicImage = image::load_from_memory(jpeg_bytes)
            .map_err(|e| format!("Failed to decode image: {}", e))?;
        let edits: Edits = Edits::default();
        Ok(Self {
            image,
            index,
            edits,
            history: EditHistory::open(edits),
            texture: None,
            rendered_edits: None,
            is_rendering: false,
            pending_preview: Arc::new(Mutex::new(None)),
            status: None,
        })
    }

    fn check_preview_completion(&mut self, ctx: &egui::Context) {
        let Some((edits, rendered)) = self.pending_preview.lock().unwrap().take() else {
            return;
        };
        self.is_rendering = false;
        self.rendered_edits = Some(edits);
        self.upload_texture(ctx, &rendered);
    }

    fn ensure_preview(&mut self, ctx: &egui::Context) {
        self.check_preview_completion(ctx);

        if self.is_rendering || self.rendered_edits == Some(self.edits) {
            return;
        }

        // Render off the UI thread so slider drags stay responsive; the
        // result is drained next frame.
        let edits: Edits = self.edits;
        let image: DynamicImage = self.image.clone();
        let slot = Arc::clone(&self.pending_preview);
        self.is_rendering = true;
        thread::spawn(move || {
            let rendered: DynamicImage = filters::apply_edits(&image, &edits);
            *slot.lock().unwrap() = Some((edits, rendered));
        });
    }

    fn upload_texture(&mut self, ctx: &egui::Context, img: &DynamicImage) {
        let rgba = img.to_rgba8();
        let (w, h) = (rgba.width() as usize, rgba.height() as usize);
        let color_image: egui::ColorImage = egui::ColorImage {
            size: [w, h],
            source_size: egui::vec2(w as f32, h as f32),
            pixels: rgba
                .pixels()
                .map(|p| egui::Color32::from_rgba_unmultiplied(p.0[0], p.0[1], p.0[2], p.0[3]))
                .collect(),
        };

        if let Some(texture_id) = self.texture {
            ctx.tex_manager().write().set(
                texture_id,
                egui::epaint::ImageDelta::full(color_image, egui::TextureOptions::LINEAR),
            );
        } else {
            self.texture = Some(ctx.tex_manager().write().alloc(
                "editor_preview".into(),
                color_image.into(),
                egui::TextureOptions::LINEAR,
            ));
        }
    }

    fn free_texture(&mut self, ctx: &egui::Context) {
        if let Some(texture_id) = self.texture.take() {
            ctx.tex_manager().write().free(texture_id);
        }
    }

    fn save_and_download(&mut self, brand_name: &str) {
        let base: String = if brand_name.is_empty() {
            "logo".to_string()
        } else {
            brand_name.split_whitespace().collect::<Vec<&str>>().join("_")
        };
        let filename: String = format!("{}-{}-edited.jpeg", base, self.index + 1);

        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&filename)
            .add_filter("JPEG", &["jpeg", "jpg"])
            .save_file()
        else {
            return;
        };

        let result: Result<(), String> = filters::encode_jpeg(
            &filters::apply_edits(&self.image, &self.edits),
            JPEG_QUALITY,
        )
        .and_then(|bytes| std::fs::write(&path, bytes).map_err(|e| e.to_string()));

        match result {
            Ok(()) => self.status = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::warn!("failed to save edited logo: {}", e);
                self.status = Some(format!("Save failed: {}", e));
            }
        }
    }

    // Returns true when the session should close.
    pub fn ui(&mut self, ctx: &egui::Context, theme: ThemeMode, brand_name: &str) -> bool {
        self.ensure_preview(ctx);
        if self.is_rendering {
            ctx.request_repaint();
        }

        let (bg_color, border_color, text_color, overlay_color) = if matches!(theme, ThemeMode::Dark) {
            (
                ColorPalette::ZINC_800,
                ColorPalette::ZINC_700,
                ColorPalette::ZINC_100,
                egui::Color32::from_rgba_premultiplied(0, 0, 0, 200),
            )
        } else {
            (
                egui::Color32::WHITE,
                ColorPalette::GRAY_300,
                ColorPalette::GRAY_900,
                egui::Color32::from_rgba_premultiplied(0, 0, 0, 150),
            )
        };

        egui::Area::new(egui::Id::new("editor_overlay"))
            .fixed_pos(egui::pos2(0.0, 0.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.painter().rect_filled(ctx.content_rect(), 0.0, overlay_color);
            });

        let mut close: bool = false;
        egui::Window::new("Edit Logo")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .order(egui::Order::Tooltip)
            .frame(
                egui::Frame::new()
                    .fill(bg_color)
                    .stroke(egui::Stroke::new(1.0, border_color))
                    .corner_radius(8.0)
                    .inner_margin(20.0),
            )
            .show(ctx, |ui| {
                ui.horizontal_top(|ui| {
                    self.render_preview(ui);
                    ui.add_space(16.0);
                    ui.vertical(|ui| {
                        self.render_sliders(ui, text_color);
                    });
                });

                ui.add_space(12.0);
                ui.separator();
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    let undo_clicked: bool = ui
                        .add_enabled(self.history.can_undo(), egui::Button::new("Undo"))
                        .clicked();
                    let redo_clicked: bool = ui
                        .add_enabled(self.history.can_redo(), egui::Button::new("Redo"))
                        .clicked();

                    if undo_clicked {
                        if let Some(edits) = self.history.undo() {
                            self.edits = edits;
                        }
                    }
                    if redo_clicked {
                        if let Some(edits) = self.history.redo() {
                            self.edits = edits;
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if style::primary_button(ui, "Save & Download", theme).clicked() {
                            self.save_and_download(brand_name);
                        }
                        if style::secondary_button(ui, "Cancel", theme).clicked() {
                            close = true;
                        }
                    });
                });

                if let Some(status) = &self.status {
                    ui.add_space(4.0);
                    ui.weak(status);
                }
            });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            close = true;
        }
        if close {
            self.free_texture(ctx);
        }
        close
    }

    fn render_preview(&mut self, ui: &mut egui::Ui) {
        let (img_w, img_h) = (self.image.width() as f32, self.image.height() as f32);
        let scale: f32 = (PREVIEW_MAX / img_w).min(PREVIEW_MAX / img_h).min(1.0);
        let size: egui::Vec2 = egui::vec2(img_w * scale, img_h * scale);

        match self.texture {
            Some(texture_id) => {
                ui.add(egui::Image::new(egui::load::SizedTexture::new(texture_id, size)));
            }
            None => {
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                ui.painter().rect_filled(rect, 4.0, ui.visuals().faint_bg_color);
                ui.put(rect, egui::Spinner::new());
            }
        }
    }

    fn render_sliders(&mut self, ui: &mut egui::Ui, label_color: egui::Color32) {
        let mut commit: bool = false;
        let rows: [(&str, &str); 5] = [
            ("Brightness", "%"),
            ("Contrast", "%"),
            ("Saturation", "%"),
            ("Hue", "deg"),
            ("Grayscale", "%"),
        ];

        for (label, suffix) in rows {
            ui.label(egui::RichText::new(label).size(12.0).color(label_color));
            let response: egui::Response = match label {
                "Brightness" => ui.add(
                    egui::Slider::new(&mut self.edits.brightness, history::BRIGHTNESS_RANGE)
                        .suffix(suffix),
                ),
                "Contrast" => ui.add(
                    egui::Slider::new(&mut self.edits.contrast, history::CONTRAST_RANGE)
                        .suffix(suffix),
                ),
                "Saturation" => ui.add(
                    egui::Slider::new(&mut self.edits.saturation, history::SATURATION_RANGE)
                        .suffix(suffix),
                ),
                "Hue" => ui.add(
                    egui::Slider::new(&mut self.edits.hue, history::HUE_RANGE).suffix(suffix),
                ),
                _ => ui.add(
                    egui::Slider::new(&mut self.edits.grayscale, history::GRAYSCALE_RANGE)
                        .suffix(suffix),
                ),
            };
            // One snapshot per gesture: commit on release, not per tick.
            if response.drag_stopped() || response.lost_focus() {
                commit = true;
            }
            ui.add_space(4.0);
        }

        if commit && self.edits != self.history.current() {
            self.edits.clamp();
            self.history.commit(self.edits);
        }
    }
}
