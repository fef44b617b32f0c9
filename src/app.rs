use crate::modules::editor::EditorSession;
use crate::modules::generation::{Generator, Outcome};
use crate::modules::imagen::ImagenClient;
use crate::modules::state::{AppState, AspectRatio, StyleTag, MAX_STYLES};
use crate::style::{self, ColorPalette, ThemeMode};
use eframe::egui;
use std::sync::Arc;

const RESULT_SLOTS: usize = 4;
const CELL_SIZE: f32 = 250.0;
const RATIO_PREVIEW_HEIGHT: f32 = 30.0;

struct ResultImage {
    bytes: Vec<u8>,
    texture: Option<egui::TextureId>,
    size: egui::Vec2,
}

enum CellAction {
    Edit(usize),
    Download(usize),
}

pub struct LogoForge {
    state: AppState,
    theme_mode: ThemeMode,
    generator: Generator,
    results: Vec<ResultImage>,
    error: Option<String>,
    generated_prompt: String,
    show_reset_confirm: bool,
    editor: Option<EditorSession>,
}

impl LogoForge {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme_mode: ThemeMode = match cc.egui_ctx.theme() {
            egui::Theme::Dark => ThemeMode::Dark,
            egui::Theme::Light => ThemeMode::Light,
        };
        style::apply_theme(&cc.egui_ctx, theme_mode);

        Self {
            state: AppState::load(),
            theme_mode,
            generator: Generator::new(Arc::new(ImagenClient::from_env())),
            results: Vec::new(),
            error: None,
            generated_prompt: String::new(),
            show_reset_confirm: false,
            editor: None,
        }
    }

    fn set_results(&mut self, ctx: &egui::Context, images: Vec<Vec<u8>>) {
        self.clear_results(ctx);
        for (i, bytes) in images.into_iter().enumerate() {
            let (texture, size) = match image::load_from_memory(&bytes) {
                Ok(img) => {
                    let size: egui::Vec2 = egui::vec2(img.width() as f32, img.height() as f32);
                    (Some(upload_texture(ctx, &img)), size)
                }
                Err(e) => {
                    log::warn!("failed to decode returned image {}: {}", i + 1, e);
                    (None, egui::Vec2::ZERO)
                }
            };
            self.results.push(ResultImage { bytes, texture, size });
        }
    }

    fn clear_results(&mut self, ctx: &egui::Context) {
        for result in self.results.drain(..) {
            if let Some(texture_id) = result.texture {
                ctx.tex_manager().write().free(texture_id);
            }
        }
    }

    fn start_generation(&mut self, ctx: &egui::Context) {
        match self.generator.start(&self.state) {
            Ok(prompt) => {
                // Stale results never sit next to an in-flight request.
                self.generated_prompt = prompt;
                self.error = None;
                self.clear_results(ctx);
            }
            Err(message) => self.error = Some(message),
        }
    }

    fn reset(&mut self, ctx: &egui::Context) {
        AppState::clear_saved();
        self.state = AppState::default();
        self.clear_results(ctx);
        self.error = None;
        self.generated_prompt.clear();
    }

    fn download_raw(&self, index: usize) {
        let Some(result) = self.results.get(index) else { return };
        let filename: String = format!("{}-{}.jpeg", self.filename_base(), index + 1);
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&filename)
            .add_filter("JPEG", &["jpeg", "jpg"])
            .save_file()
        else {
            return;
        };
        if let Err(e) = std::fs::write(&path, &result.bytes) {
            log::warn!("failed to save logo: {}", e);
        }
    }

    fn filename_base(&self) -> String {
        let brand: &str = &self.state.form_data.brand_name;
        if brand.is_empty() {
            "logo".to_string()
        } else {
            brand.split_whitespace().collect::<Vec<&str>>().join("_")
        }
    }

    fn open_editor(&mut self, index: usize) {
        let Some(result) = self.results.get(index) else { return };
        match EditorSession::open(&result.bytes, index) {
            Ok(session) => self.editor = Some(session),
            Err(e) => log::warn!("failed to open editor: {}", e),
        }
    }

    fn header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Logo Forge").size(26.0).strong());
                ui.label(
                    egui::RichText::new(
                        "Craft the perfect prompt and generate your brand's logo with AI.",
                    )
                    .size(13.0)
                    .color(match self.theme_mode {
                        ThemeMode::Dark => ColorPalette::ZINC_400,
                        ThemeMode::Light => ColorPalette::GRAY_500,
                    }),
                );
            });
            ui.add_space(10.0);
        });
    }

    fn form_panel(&mut self, ctx: &egui::Context) {
        let theme: ThemeMode = self.theme_mode;
        let running: bool = self.generator.is_running();
        let mut state_changed: bool = false;
        let mut generate_clicked: bool = false;

        egui::SidePanel::left("form_panel")
            .resizable(true)
            .default_width(380.0)
            .min_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.add_space(8.0);

                        state_changed |= text_field(
                            ui, "1. Brand Name",
                            &mut self.state.form_data.brand_name,
                            "Your Brand's Name Here", false,
                        );
                        state_changed |= text_field(
                            ui, "2. Industry/Niche",
                            &mut self.state.form_data.industry,
                            "e.g., Artisan Coffee Roaster, Tech Startup", false,
                        );

                        field_label(ui, "3. Desired Logo Style/Aesthetics");
                        ui.weak(format!("(Choose up to {})", MAX_STYLES));
                        ui.horizontal_wrapped(|ui| {
                            for tag in StyleTag::ALL {
                                let selected: bool = self.state.is_style_selected(tag);
                                if ui.selectable_label(selected, tag.label()).clicked() {
                                    self.state.toggle_style(tag);
                                    state_changed = true;
                                }
                            }
                        });
                        ui.add_space(8.0);

                        state_changed |= text_field(
                            ui, "4. Key Visual Elements (Optional)",
                            &mut self.state.form_data.visuals,
                            "e.g., A subtle leaf, interlocking gears", true,
                        );
                        state_changed |= text_field(
                            ui, "5. Preferred Color Palette (Optional)",
                            &mut self.state.form_data.colors,
                            "e.g., Blues and greens for trust and growth", true,
                        );
                        state_changed |= text_field(
                            ui, "6. Logo Text: Brand Name & Captions",
                            &mut self.state.form_data.logo_text,
                            "e.g., \"Innovate\" or \"Innovate Forward\"", true,
                        );

                        field_label(ui, "7. Aspect Ratio");
                        ui.horizontal_wrapped(|ui| {
                            for ratio in AspectRatio::ALL {
                                let selected: bool = self.state.aspect_ratio == ratio;
                                if ratio_button(ui, ratio, selected, theme).clicked() {
                                    self.state.aspect_ratio = ratio;
                                    state_changed = true;
                                }
                            }
                        });
                        ui.add_space(12.0);

                        ui.horizontal(|ui| {
                            ui.add_enabled_ui(!running, |ui| {
                                let label: &str =
                                    if running { "Generating..." } else { "Generate Logo" };
                                if style::primary_button(ui, label, theme).clicked() {
                                    generate_clicked = true;
                                }
                                if style::secondary_button(ui, "Reset Form", theme).clicked() {
                                    self.show_reset_confirm = true;
                                }
                            });
                            if running {
                                ui.add(egui::Spinner::new());
                            }
                        });

                        if let Some(error) = &self.error {
                            ui.add_space(8.0);
                            ui.label(
                                egui::RichText::new(error)
                                    .size(13.0)
                                    .color(style::error_color(theme)),
                            );
                        }

                        ui.add_space(8.0);
                    });
            });

        if state_changed {
            self.state.save();
        }
        if generate_clicked {
            self.start_generation(ctx);
        }
    }

    fn results_panel(&mut self, ctx: &egui::Context) {
        let theme: ThemeMode = self.theme_mode;
        let running: bool = self.generator.is_running();
        let mut action: Option<CellAction> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add_space(8.0);
                    ui.heading("Generated Logos");
                    ui.add_space(4.0);

                    if !self.generated_prompt.is_empty() {
                        field_label(ui, "Final Prompt Sent to AI");
                        egui::Frame::new()
                            .fill(ui.visuals().faint_bg_color)
                            .corner_radius(6.0)
                            .inner_margin(10.0)
                            .show(ui, |ui| {
                                ui.set_width(ui.available_width());
                                ui.label(
                                    egui::RichText::new(&self.generated_prompt).size(12.5),
                                );
                            });
                        ui.add_space(8.0);
                    }

                    egui::Grid::new("image_grid")
                        .spacing(egui::vec2(12.0, 12.0))
                        .show(ui, |ui| {
                            for i in 0..RESULT_SLOTS {
                                if let Some(cell) = self.result_cell(ui, i, running, theme) {
                                    action = Some(cell);
                                }
                                if i % 2 == 1 {
                                    ui.end_row();
                                }
                            }
                        });
                });
        });

        match action {
            Some(CellAction::Edit(i)) => self.open_editor(i),
            Some(CellAction::Download(i)) => self.download_raw(i),
            None => {}
        }
    }

    fn result_cell(
        &self,
        ui: &mut egui::Ui,
        index: usize,
        running: bool,
        theme: ThemeMode,
    ) -> Option<CellAction> {
        let mut action: Option<CellAction> = None;

        ui.vertical(|ui| {
            let (rect, _) = ui.allocate_exact_size(
                egui::vec2(CELL_SIZE, CELL_SIZE),
                egui::Sense::hover(),
            );
            if running {
                ui.painter().rect_filled(rect, 8.0, ui.visuals().faint_bg_color);
                ui.painter().text(
                    rect.center() + egui::vec2(0.0, 16.0),
                    egui::Align2::CENTER_CENTER,
                    "The AI is working...",
                    egui::FontId::proportional(13.0),
                    ui.visuals().weak_text_color(),
                );
                ui.put(
                    egui::Rect::from_center_size(
                        rect.center() - egui::vec2(0.0, 14.0),
                        egui::vec2(26.0, 26.0),
                    ),
                    egui::Spinner::new(),
                );
                return;
            }

            match self.results.get(index) {
                Some(result) => {
                    if let Some(texture_id) = result.texture {
                        let scale: f32 = (CELL_SIZE / result.size.x)
                            .min(CELL_SIZE / result.size.y)
                            .min(1.0);
                        let draw_size: egui::Vec2 = result.size * scale;
                        let draw_rect: egui::Rect =
                            egui::Rect::from_center_size(rect.center(), draw_size);
                        ui.painter().rect_filled(rect, 8.0, egui::Color32::WHITE);
                        ui.painter().image(
                            texture_id,
                            draw_rect,
                            egui::Rect::from_min_max(
                                egui::pos2(0.0, 0.0),
                                egui::pos2(1.0, 1.0),
                            ),
                            egui::Color32::WHITE,
                        );
                    } else {
                        ui.painter().rect_filled(rect, 8.0, ui.visuals().faint_bg_color);
                    }

                    ui.horizontal(|ui| {
                        if style::secondary_button(ui, "Edit", theme).clicked() {
                            action = Some(CellAction::Edit(index));
                        }
                        if style::secondary_button(ui, "Download", theme).clicked() {
                            action = Some(CellAction::Download(index));
                        }
                    });
                }
                None => {
                    ui.painter().rect_filled(rect, 8.0, ui.visuals().faint_bg_color);
                    if index == 0 {
                        ui.painter().text(
                            rect.center(),
                            egui::Align2::CENTER_CENTER,
                            "Your logos will appear here",
                            egui::FontId::proportional(13.0),
                            ui.visuals().weak_text_color(),
                        );
                    }
                }
            }
        });

        action
    }

    fn render_reset_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_reset_confirm {
            return;
        }

        let (bg_color, border_color, text_color, overlay_color) =
            if matches!(self.theme_mode, ThemeMode::Dark) {
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

        egui::Area::new(egui::Id::new("reset_overlay"))
            .fixed_pos(egui::pos2(0.0, 0.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.painter().rect_filled(ctx.content_rect(), 0.0, overlay_color);
            });

        egui::Window::new("Reset Form")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .order(egui::Order::Tooltip)
            .frame(
                egui::Frame::new()
                    .fill(bg_color)
                    .stroke(egui::Stroke::new(1.0, border_color))
                    .corner_radius(8.0)
                    .inner_margin(24.0),
            )
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new("Are you sure you want to reset the form?")
                            .size(16.0)
                            .color(text_color),
                    );
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new(
                            "All your inputs and generated images will be lost.",
                        )
                        .size(13.0)
                        .color(if matches!(self.theme_mode, ThemeMode::Dark) {
                            ColorPalette::ZINC_400
                        } else {
                            ColorPalette::GRAY_600
                        }),
                    );
                    ui.add_space(24.0);
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 12.0;

                        let reset_clicked: bool =
                            style::primary_button(ui, "Reset", self.theme_mode).clicked();
                        let cancel_clicked: bool =
                            style::secondary_button(ui, "Cancel", self.theme_mode).clicked();

                        if reset_clicked {
                            self.show_reset_confirm = false;
                            self.reset(ctx);
                        }
                        if cancel_clicked {
                            self.show_reset_confirm = false;
                        }
                    });
                    ui.add_space(8.0);
                });
            });
    }
}

impl eframe::App for LogoForge {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let system_theme: ThemeMode = match ctx.theme() {
            egui::Theme::Dark => ThemeMode::Dark,
            egui::Theme::Light => ThemeMode::Light,
        };
        if self.theme_mode != system_theme {
            self.theme_mode = system_theme;
            style::apply_theme(ctx, self.theme_mode);
        }

        match self.generator.poll() {
            Some(Outcome::Images(images)) => self.set_results(ctx, images),
            Some(Outcome::Error(message)) => self.error = Some(message),
            None => {}
        }
        if self.generator.is_running() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.render_reset_dialog(ctx);

        if let Some(editor) = &mut self.editor {
            let brand: String = self.state.form_data.brand_name.clone();
            if editor.ui(ctx, self.theme_mode, &brand) {
                self.editor = None;
            }
        }

        self.header(ctx);
        self.form_panel(ctx);
        self.results_panel(ctx);
    }
}

fn field_label(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).size(13.5).strong());
}

fn text_field(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut String,
    hint: &str,
    multiline: bool,
) -> bool {
    field_label(ui, label);
    let response: egui::Response = if multiline {
        ui.add(
            egui::TextEdit::multiline(value)
                .hint_text(hint)
                .desired_rows(2)
                .desired_width(f32::INFINITY),
        )
    } else {
        ui.add(
            egui::TextEdit::singleline(value)
                .hint_text(hint)
                .desired_width(f32::INFINITY),
        )
    };
    ui.add_space(8.0);
    response.changed()
}

fn ratio_button(
    ui: &mut egui::Ui,
    ratio: AspectRatio,
    selected: bool,
    theme: ThemeMode,
) -> egui::Response {
    let preview_w: f32 = ratio.fraction() * RATIO_PREVIEW_HEIGHT;
    let desired: egui::Vec2 = egui::vec2(
        preview_w.max(36.0) + 20.0,
        RATIO_PREVIEW_HEIGHT + 34.0,
    );
    let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::click());

    if ui.is_rect_visible(rect) {
        let visuals = ui.style().interact(&response);
        let painter = ui.painter();

        painter.rect_filled(rect, 6.0, visuals.bg_fill);
        if selected {
            painter.rect_stroke(
                rect,
                6.0,
                egui::Stroke::new(1.5, ColorPalette::BLUE_500),
                egui::StrokeKind::Inside,
            );
        }

        let preview_rect: egui::Rect = egui::Rect::from_center_size(
            egui::pos2(rect.center().x, rect.min.y + 8.0 + RATIO_PREVIEW_HEIGHT / 2.0),
            egui::vec2(preview_w, RATIO_PREVIEW_HEIGHT),
        );
        let preview_color: egui::Color32 = if selected {
            ColorPalette::BLUE_500
        } else {
            match theme {
                ThemeMode::Dark => ColorPalette::ZINC_500,
                ThemeMode::Light => ColorPalette::GRAY_400,
            }
        };
        painter.rect_stroke(
            preview_rect,
            2.0,
            egui::Stroke::new(1.5, preview_color),
            egui::StrokeKind::Inside,
        );

        painter.text(
            egui::pos2(rect.center().x, rect.max.y - 12.0),
            egui::Align2::CENTER_CENTER,
            ratio.label(),
            egui::FontId::proportional(12.0),
            visuals.text_color(),
        );
    }

    response
}

fn upload_texture(ctx: &egui::Context, img: &image::DynamicImage) -> egui::TextureId {
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
    ctx.tex_manager()
        .write()
        .alloc("result_logo".into(), color_image.into(), egui::TextureOptions::LINEAR)
}
