use site_signoff::address_book::{AddressBook, ADDRESS_BOOK_FILE};
use site_signoff::gui::SignoffApp;
use site_signoff::logging;
use site_signoff::settings::{Settings, SETTINGS_FILE};

use eframe::egui;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging);

    let address_book = AddressBook::load(Path::new(ADDRESS_BOOK_FILE));
    let (width, height) = settings.window_size.unwrap_or((1000.0, 760.0));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([720.0, 540.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Site Sign-off",
        native_options,
        Box::new(move |_cc| {
            Box::new(SignoffApp::new(
                settings,
                address_book,
                PathBuf::from(ADDRESS_BOOK_FILE),
            ))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to start ui: {e}"))
}
