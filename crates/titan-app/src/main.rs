//! Titan desktop entry point.
//!
//! Loads the configuration, discovers the built-in apps, and runs the shell
//! on the terminal backend (or an SDL2 window with `--features sdl`).
//! Left/Right switch apps, Backspace/Esc is Back, Home goes to the first
//! app, Tab lists running apps, `a` opens the app list, `q` quits.

mod backend;
#[cfg(feature = "sdl")]
mod sdl;
#[cfg(not(feature = "sdl"))]
mod terminal;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use titan_core::config::TitanConfig;
use titan_core::{AppRegistry, InputOutcome, Shell, scene};

use backend::ShellBackend;

const FRAME: Duration = Duration::from_millis(16);
const LOG_FILE: &str = "titan.log";

fn main() -> Result<()> {
    init_logging()?;
    std::panic::set_hook(Box::new(|info| {
        log::error!("panic: {info}");
    }));

    let config = TitanConfig::discover().context("loading configuration")?;
    log::info!(
        "Starting {} ({}x{})",
        config.window.title,
        config.window.width,
        config.window.height
    );

    let registry = AppRegistry::from_catalog(&titan_apps::builtin_catalog(), &config.apps)
        .context("discovering apps")?;
    let mut backend = backend::create(&config.window).context("opening backend")?;
    let mut shell = Shell::new(config, registry);
    if let Err(e) = shell.start(0) {
        backend.shutdown()?;
        return Err(e).context("no app could be started");
    }

    let result = run(&mut shell, backend.as_mut());
    backend.shutdown()?;
    log::info!("Titan shut down cleanly");
    result
}

fn run(shell: &mut Shell, backend: &mut dyn ShellBackend) -> Result<()> {
    let epoch = Instant::now();
    loop {
        for event in backend.poll_events() {
            if shell.handle_input(&event) == InputOutcome::Quit {
                log::info!("Quit requested");
            }
        }
        if shell.quit_requested() {
            return Ok(());
        }
        let now = u64::try_from(epoch.elapsed().as_millis()).unwrap_or(u64::MAX);
        shell.run_due(now);
        backend.present(&scene::build(shell))?;
        std::thread::sleep(FRAME);
    }
}

/// The terminal backend owns the screen, so logs go to a file there.
fn init_logging() -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cfg!(not(feature = "sdl")) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(LOG_FILE)
            .with_context(|| format!("opening {LOG_FILE}"))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
