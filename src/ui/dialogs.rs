use gtk4 as gtk;
use gtk::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use std::cell::RefCell;

use crate::config::WelcomeSettings;

const DEVELOPER: &str = "Daniel Nylander";
const WEBSITE: &str = "https://github.com/yeager/process-explorer";
const ISSUE_URL: &str = "https://github.com/yeager/process-explorer/issues";
const TRANSLATIONS_URL: &str = "https://www.transifex.com/danielnylander/process-explorer";

pub fn show_about(parent: &adw::ApplicationWindow) {
    let about = adw::AboutWindow::builder()
        .transient_for(parent)
        .modal(true)
        .application_name("Process Explorer")
        .application_icon("utilities-system-monitor")
        .version(env!("CARGO_PKG_VERSION"))
        .developer_name(DEVELOPER)
        .developers([DEVELOPER])
        .license_type(gtk::License::Gpl30)
        .website(WEBSITE)
        .issue_url(ISSUE_URL)
        .comments("GTK4 process explorer")
        .build();
    about.add_link("Translations", TRANSLATIONS_URL);
    about.present();
}

/// One-time greeting. Dismissing it records the flag on disk.
pub fn show_welcome(parent: &impl IsA<gtk::Window>, settings: WelcomeSettings) {
    let dialog = adw::Window::builder()
        .transient_for(parent)
        .modal(true)
        .title("Welcome")
        .default_width(420)
        .default_height(480)
        .build();

    let page = adw::StatusPage::builder()
        .icon_name("utilities-system-monitor-symbolic")
        .title("Welcome to Process Explorer")
        .description(
            "Monitor and manage system processes.\n\n\
             ✓ View running processes\n\
             ✓ CPU and memory usage\n\
             ✓ Process tree view",
        )
        .build();

    let button = gtk::Button::with_label("Get Started");
    button.add_css_class("suggested-action");
    button.add_css_class("pill");
    button.set_halign(gtk::Align::Center);
    button.set_margin_top(12);
    page.set_child(Some(&button));

    let header = adw::HeaderBar::new();
    header.set_show_title(false);

    let toolbar_view = adw::ToolbarView::new();
    toolbar_view.add_top_bar(&header);
    toolbar_view.set_content(Some(&page));
    dialog.set_content(Some(&toolbar_view));

    let settings = RefCell::new(settings);
    let dialog_ref = dialog.clone();
    button.connect_clicked(move |_| {
        match settings.borrow_mut().mark_shown() {
            Ok(()) => log::info!("Welcome dialog dismissed"),
            Err(e) => log::warn!("Could not save welcome state: {:#}", e),
        }
        dialog_ref.close();
    });

    dialog.present();
}
