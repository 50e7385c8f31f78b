use gtk4 as gtk;
use gtk::prelude::*;
use gtk::glib;
use libadwaita as adw;
use adw::prelude::*;

use crate::backend::Collector;
use crate::config::Config;
use crate::model::SystemSnapshot;
use crate::ui::dialogs;
use crate::ui::process_tab::ProcessTab;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct MainWindow;

impl MainWindow {
    pub fn new(app: &adw::Application) -> adw::ApplicationWindow {
        let config = Config::load();

        let window = adw::ApplicationWindow::builder()
            .application(app)
            .title("Process Explorer")
            .default_width(config.window_width)
            .default_height(config.window_height)
            .build();

        // Start backend collector
        let (collector, handle, rx) = Collector::new(config.refresh_interval());
        if let Err(e) = collector.start() {
            log::error!("Failed to spawn collector thread: {}", e);
        }

        // Header bar
        let header = adw::HeaderBar::new();

        let theme_button = gtk::Button::from_icon_name("weather-clear-night-symbolic");
        theme_button.set_tooltip_text(Some("Toggle theme"));
        theme_button.connect_clicked(|_| toggle_theme());
        header.pack_end(&theme_button);

        let about_button = gtk::Button::from_icon_name("help-about-symbolic");
        about_button.set_tooltip_text(Some("About"));
        let window_ref = window.clone();
        about_button.connect_clicked(move |_| dialogs::show_about(&window_ref));
        header.pack_end(&about_button);

        let process_tab = ProcessTab::new(handle, config.signal_refresh_delay());

        // Status bar with clock
        let status_bar = gtk::Box::new(gtk::Orientation::Horizontal, 12);
        status_bar.add_css_class("status-bar");
        let clock = gtk::Label::new(None);
        clock.set_xalign(0.0);
        clock.add_css_class("dim-label");
        status_bar.append(&clock);

        let main_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        main_box.append(&header);
        main_box.append(&process_tab.widget);
        main_box.append(&gtk::Separator::new(gtk::Orientation::Horizontal));
        main_box.append(&status_bar);
        window.set_content(Some(&main_box));

        // Poll for updates from the collector
        let process_tab = Rc::new(RefCell::new(process_tab));
        glib::timeout_add_local(Duration::from_millis(100), move || {
            // Drain channel, keep latest
            let mut latest: Option<SystemSnapshot> = None;
            while let Ok(snapshot) = rx.try_recv() {
                latest = Some(snapshot);
            }
            if let Some(snapshot) = latest {
                process_tab.borrow_mut().update(&snapshot);
            }
            glib::ControlFlow::Continue
        });

        update_clock(&clock);
        glib::timeout_add_local(config.clock_interval(), move || {
            update_clock(&clock);
            glib::ControlFlow::Continue
        });

        window
    }
}

fn update_clock(label: &gtk::Label) {
    match glib::DateTime::now_local().and_then(|now| now.format(CLOCK_FORMAT)) {
        Ok(text) => label.set_text(&text),
        Err(e) => log::debug!("Clock unavailable: {}", e),
    }
}

fn toggle_theme() {
    let manager = adw::StyleManager::default();
    let scheme = if manager.is_dark() {
        adw::ColorScheme::ForceLight
    } else {
        adw::ColorScheme::ForceDark
    };
    manager.set_color_scheme(scheme);
}
