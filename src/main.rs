use eframe::egui;

mod app;
mod modules;
mod style;

use app::LogoForge;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Logo Forge"),
        ..Default::default()
    };
    eframe::run_native(
        "Logo Forge",
        options,
        Box::new(|cc| Ok(Box::new(LogoForge::new(cc)))),
    )
}
