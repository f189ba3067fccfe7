//! # Mithl - headless compositor driver
//!
//! Boots the compositor core against the software display, opens a couple
//! of demo windows, replays a short scripted input sequence and runs a fixed
//! number of frames. Useful for eyeballing the chrome and for profiling the
//! frame pipeline without any hardware attached.

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use mithl_compositor::window;
use mithl_compositor::{
    ElementId, GuiEvent, GuiManager, MithlConfig, Modifiers, OwnerId, Rect, SoftwareDisplay,
};

#[derive(Parser)]
#[command(name = "mithl")]
#[command(about = "Compositing and window-management core of the Mithl desktop")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/mithl/mithl.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 3)]
    frames: u32,

    /// Write the final visible buffer to a PNG file
    #[arg(long)]
    screenshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = MithlConfig::load(&cli.config);
    init_logging(cli.debug || loaded.as_ref().is_ok_and(|c| c.general.debug));

    let config = match loaded {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            warn!("⚠️ Failed to load configuration: {:#}", e);
            info!("📝 Using default configuration");
            MithlConfig::default()
        }
    };

    info!("🚀 Starting Mithl compositor core");
    info!(
        "📄 Version: {} (built {})",
        mithl_compositor::VERSION,
        mithl_compositor::BUILD_DATE
    );

    let mut display = SoftwareDisplay::new(config.screen.width, config.screen.height)?;
    let mut gui = GuiManager::new(config)?;

    let terminal = open_demo_windows(&mut gui)?;
    script_input(&mut gui, terminal)?;

    for _ in 0..cli.frames {
        let report = gui.run_frame(&mut display);
        info!(
            "🎞️ Frame {}: {} events, actions {:?}, presented {:?}",
            gui.frames(),
            report.events_dispatched,
            report.actions,
            report.presented
        );
    }

    while let Some(event) = gui.next_window_event(terminal)? {
        info!("📨 Terminal inbox: {:?} at {:?}", event.kind, event.position);
    }

    if let Some(path) = &cli.screenshot {
        display.save_png(path)?;
        info!("📸 Screenshot written to {}", path.display());
    }

    info!("👋 Mithl shutting down");
    Ok(())
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Opens a kernel-owned file browser with two tabs and a terminal owned by a
/// user process. Returns the terminal.
fn open_demo_windows(gui: &mut GuiManager) -> Result<ElementId> {
    let files = gui.create_window("Files", Rect::new(60, 80, 420, 300));
    let home = gui.create_label("/home", Rect::default());
    let trash = gui.create_label("/trash", Rect::default());
    gui.add_tab(files, "Home", home)?;
    gui.add_tab(files, "Trash", trash)?;

    gui.set_current_owner(OwnerId(2));
    let terminal = gui.create_window("Terminal", Rect::new(520, 120, 380, 260));
    gui.set_current_owner(OwnerId::KERNEL);

    let prompt = gui.create_label("$ _", Rect::new(530, 160, 200, 16));
    gui.add_element(terminal, prompt)?;
    Ok(terminal)
}

/// Queues a drag of the terminal, a tab switch and a key press.
fn script_input(gui: &mut GuiManager, terminal: ElementId) -> Result<()> {
    let bounds = gui
        .element(terminal)
        .map(|e| e.bounds)
        .ok_or_else(|| anyhow::anyhow!("demo terminal vanished"))?;

    let grab = (bounds.x + 40, bounds.y + 10);
    gui.post_event(GuiEvent::mouse_down(grab.0, grab.1));
    gui.post_event(GuiEvent::mouse_move(grab.0 - 30, grab.1 + 20));
    gui.post_event(GuiEvent::mouse_move(grab.0 - 60, grab.1 + 40));
    gui.post_event(GuiEvent::mouse_up(grab.0 - 60, grab.1 + 40));
    gui.post_event(GuiEvent::key_press(b'l', Modifiers::CTRL));

    let files = gui
        .scene()
        .iter()
        .find(|(_, e)| e.window().is_some_and(|w| w.title == "Files"))
        .map(|(id, e)| (id, e.bounds));
    if let Some((_, files_bounds)) = files {
        let tab = window::tab_rect(files_bounds, &gui.config().chrome, 1, 2);
        let (x, y) = (tab.x + tab.width / 2, tab.y + tab.height / 2);
        gui.post_event(GuiEvent::mouse_down(x, y));
        gui.post_event(GuiEvent::mouse_up(x, y));
    }

    info!("🎬 Queued {} scripted events", gui.pending_events());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["mithl"]).unwrap();
        assert!(!cli.debug);
        assert_eq!(cli.frames, 3);
        assert!(cli.screenshot.is_none());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "mithl",
            "--debug",
            "--frames",
            "10",
            "--screenshot",
            "out.png",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.frames, 10);
        assert_eq!(cli.screenshot, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn test_demo_script_runs() {
        let mut gui = GuiManager::new(MithlConfig::default()).unwrap();
        let terminal = open_demo_windows(&mut gui).unwrap();
        script_input(&mut gui, terminal).unwrap();
        assert_eq!(gui.pending_events(), 7);

        let mut display = SoftwareDisplay::new(1024, 768).unwrap();
        let report = gui.run_frame(&mut display);
        assert_eq!(gui.pending_events(), 0);
        assert!(report.presented.is_some());
        assert_eq!(gui.element(terminal).unwrap().bounds.origin().x, 460);
    }
}
