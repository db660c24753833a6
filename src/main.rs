use winit::event_loop::EventLoop;

use classroom::AppConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    log::info!(
        "textures from {} ({})",
        config.assets_dir.display(),
        if config.procedural_textures { "procedural" } else { "files" }
    );

    // Without an event loop there is no window to report into.
    let event_loop = EventLoop::new().expect("failed to create event loop");

    if let Err(e) = classroom::run(event_loop, config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
