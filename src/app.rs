use gtk4 as gtk;
use gtk::prelude::*;
use gtk::gio;
use libadwaita as adw;
use adw::prelude::*;

use crate::config::WelcomeSettings;
use crate::ui::dialogs;
use crate::window::MainWindow;
use crate::CSS;
use crate::APP_ID;

pub struct ProcessExplorerApp {
    app: adw::Application,
}

impl ProcessExplorerApp {
    pub fn new() -> Self {
        let app = adw::Application::builder()
            .application_id(APP_ID)
            .build();

        app.connect_startup(|app| {
            load_css();

            let quit = gio::SimpleAction::new("quit", None);
            let app_ref = app.clone();
            quit.connect_activate(move |_, _| app_ref.quit());
            app.add_action(&quit);
            app.set_accels_for_action("app.quit", &["<Control>q"]);
        });

        app.connect_activate(|app| {
            if let Some(window) = app.active_window() {
                window.present();
                return;
            }
            let window = MainWindow::new(app);
            window.present();

            let settings = WelcomeSettings::load();
            if !settings.welcome_shown {
                dialogs::show_welcome(&window, settings);
            }
        });

        Self { app }
    }

    pub fn run(&self) -> i32 {
        self.app.run().into()
    }
}

fn load_css() {
    let provider = gtk::CssProvider::new();
    provider.load_from_string(CSS);

    match gtk::gdk::Display::default() {
        Some(display) => gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => log::warn!("No default display; skipping stylesheet"),
    }
}
