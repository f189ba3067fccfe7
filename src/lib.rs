//! # Mithl Compositor Library
//!
//! Compositing and window-management core for the Mithl desktop. Everything
//! drawn on screen is an element in a single scene tree; the compositor
//! tracks which screen areas changed, routes input to exactly one element,
//! runs the window interaction state machine and lays windows out in a
//! tiling placement tree.
//!
//! ## Architecture
//!
//! - `compositor`: [`GuiManager`], the context object and frame pipeline
//! - `scene`: element arena, z-order, hit testing
//! - `renderer`: geometry, damage tracking and display backends
//! - `window`: per-window state and chrome geometry
//! - `wm`: tiling placement tree (floating, split, tabbed, stacked)
//! - `input`: events, modifiers and global shortcuts
//! - `ipc`: per-window inboxes for owning processes
//! - `config`: TOML configuration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mithl_compositor::{GuiManager, MithlConfig, Rect, SoftwareDisplay};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = MithlConfig::default();
//!     let mut display = SoftwareDisplay::new(config.screen.width, config.screen.height)?;
//!     let mut gui = GuiManager::new(config)?;
//!
//!     gui.create_window("Terminal", Rect::new(100, 100, 400, 300));
//!     let report = gui.run_frame(&mut display);
//!     println!("presented {:?}", report.presented);
//!     Ok(())
//! }
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod input;
pub mod ipc;
pub mod renderer;
pub mod scene;
pub mod window;
pub mod wm;

// Re-export main types for easy access
pub use compositor::{BackgroundPainter, FrameReport, GuiManager};
pub use config::MithlConfig;
pub use error::{GuiError, GuiResult};
pub use input::{EventKind, GuiEvent, Modifiers, MouseButton, ShortcutAction};
pub use ipc::{OwnerId, WindowInbox};
pub use renderer::{Color, Display, Point, RecordingDisplay, Rect, Renderer, SoftwareDisplay};
pub use scene::{ElementId, VisualState};
pub use window::WindowMode;
pub use wm::{LayoutMode, WmNodeId};

// Re-export common error types
pub use anyhow::{Context, Error, Result};

/// Version information for Mithl
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const BUILD_DATE: &str = env!("BUILD_DATE");
