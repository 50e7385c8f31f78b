mod app;
mod backend;
mod config;
mod model;
mod ui;
mod util;
mod window;

const APP_ID: &str = "io.github.yeager.ProcessExplorer";
const CSS: &str = include_str!("../style/style.css");

fn main() {
    env_logger::init();

    let app = app::ProcessExplorerApp::new();
    std::process::exit(app.run());
}
