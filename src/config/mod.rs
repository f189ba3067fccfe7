//! Configuration management for the Mithl compositor
//!
//! This module handles loading, parsing, and validating configuration
//! from TOML files: screen geometry, window chrome metrics, global
//! shortcuts, and theme colours.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::input::{Modifiers, ShortcutAction};
use crate::renderer::{Color, Rect};

/// Main configuration struct containing all compositor settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MithlConfig {
    /// Screen dimensions
    #[serde(default)]
    pub screen: ScreenConfig,

    /// Window decoration metrics
    #[serde(default)]
    pub chrome: ChromeConfig,

    /// Global shortcuts and cross-process delivery
    #[serde(default)]
    pub input: InputConfig,

    /// Colours used by default painting
    #[serde(default)]
    pub theme: ThemeConfig,

    /// General compositor settings
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

/// Window chrome geometry (pixels)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChromeConfig {
    /// Height of the desktop top bar, excluded from the maximize area
    pub top_bar_height: i32,

    /// Space kept free for the dock at the bottom of the screen
    pub dock_reserve: i32,

    /// Height of a window's title bar
    pub title_bar_height: i32,

    /// Height of the tab strip below the title bar (only when tabs exist)
    pub tab_bar_height: i32,

    /// Inset between the window edge and its tab content
    pub content_inset: i32,

    /// Radius of the close/minimize/maximize controls
    pub control_radius: i32,

    /// Distance between neighbouring control centres
    pub control_spacing: i32,

    /// Distance from the right window edge to the close control centre
    pub control_margin: i32,

    /// X coordinate windows are parked at while minimized or closed
    pub hidden_x: i32,
}

/// One global shortcut binding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortcutBinding {
    /// Translated key code
    pub key: u8,

    /// Required modifiers, e.g. `"CTRL | ALT"`
    #[serde(default)]
    pub modifiers: Modifiers,

    /// Action emitted when the binding matches
    pub action: ShortcutAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Shortcuts checked before any event is routed
    pub shortcuts: Vec<ShortcutBinding>,

    /// Maximum number of queued events per window inbox
    #[serde(default = "InputConfig::default_inbox_capacity")]
    pub inbox_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThemeConfig {
    pub background: Color,
    pub window_body: Color,
    pub title_bar: Color,
    pub title_text: Color,
    pub tab_bar: Color,
    pub tab_active: Color,
    pub tab_inactive: Color,
    pub control_close: Color,
    pub control_minimize: Color,
    pub control_maximize: Color,
    pub panel: Color,
    pub label: Color,
    pub label_text: Color,
}

/// General compositor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Enable debug logging
    pub debug: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            top_bar_height: 24,
            dock_reserve: 90,
            title_bar_height: 30,
            tab_bar_height: 24,
            content_inset: 2,
            control_radius: 6,
            control_spacing: 20,
            control_margin: 20,
            hidden_x: -1000,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            // Left and right "Windows" keys open the launcher
            shortcuts: vec![
                ShortcutBinding {
                    key: 0x5B,
                    modifiers: Modifiers::empty(),
                    action: ShortcutAction::ToggleLauncher,
                },
                ShortcutBinding {
                    key: 0x5C,
                    modifiers: Modifiers::empty(),
                    action: ShortcutAction::ToggleLauncher,
                },
            ],
            inbox_capacity: Self::default_inbox_capacity(),
        }
    }
}

impl InputConfig {
    fn default_inbox_capacity() -> usize {
        256
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: Color(0xFF33_6699), // Slate blue
            window_body: Color(0xFFFF_FFFF),
            title_bar: Color(0xFFEC_ECEC),
            title_text: Color(0xFF40_4040),
            tab_bar: Color(0xFFF0_F0F0),
            tab_active: Color(0xFFFF_FFFF),
            tab_inactive: Color(0xFFE0_E0E0),
            control_close: Color(0xFFFF_5F56),
            control_minimize: Color(0xFFFF_BD2E),
            control_maximize: Color(0xFF27_C93F),
            panel: Color(0xFFCC_CCCC),
            label: Color(0xFFE0_E0E0),
            label_text: Color(0xFF00_0000),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { debug: false }
    }
}

impl MithlConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Expand ~ to home directory
        let expanded_path = if path.to_string_lossy().starts_with('~') {
            let home = std::env::var("HOME").context("Failed to get HOME environment variable")?;
            let rest = path.strip_prefix("~").unwrap_or(path);
            Path::new(&home).join(rest)
        } else {
            path.to_path_buf()
        };

        let contents = fs::read_to_string(&expanded_path)
            .with_context(|| format!("Failed to read config file: {}", expanded_path.display()))?;

        let config: MithlConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", expanded_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.screen.width == 0 || self.screen.height == 0 {
            anyhow::bail!(
                "Invalid screen size {}x{}: both dimensions must be non-zero",
                self.screen.width,
                self.screen.height
            );
        }

        if self.chrome.title_bar_height <= 0 {
            anyhow::bail!("Invalid title_bar_height: must be positive");
        }

        if self.chrome.tab_bar_height < 0 || self.chrome.content_inset < 0 {
            anyhow::bail!("Invalid chrome metrics: tab_bar_height and content_inset must not be negative");
        }

        if self.chrome.control_radius <= 0 {
            anyhow::bail!("Invalid control_radius: must be positive");
        }

        if self.usable_area().is_empty() {
            anyhow::bail!(
                "Top bar ({}) and dock reserve ({}) leave no usable screen area",
                self.chrome.top_bar_height,
                self.chrome.dock_reserve
            );
        }

        if self.input.inbox_capacity == 0 {
            anyhow::bail!("Invalid inbox_capacity: must be at least 1");
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, contents).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Merge a partial configuration into this one
    /// Sections of the partial config that differ from the defaults win
    pub fn merge_partial(mut self, partial: MithlConfig) -> Self {
        let default_config = MithlConfig::default();

        if partial.screen != default_config.screen {
            self.screen = partial.screen;
        }
        if partial.chrome != default_config.chrome {
            self.chrome = partial.chrome;
        }
        if partial.input != default_config.input {
            self.input = partial.input;
        }
        if partial.theme != default_config.theme {
            self.theme = partial.theme;
        }
        if partial.general != default_config.general {
            self.general = partial.general;
        }

        self
    }

    /// Full screen rectangle
    pub fn screen_rect(&self) -> Rect {
        Rect::new(0, 0, self.screen.width as i32, self.screen.height as i32)
    }

    /// Screen area a maximized window fills: everything below the top bar
    /// and above the dock reserve.
    pub fn usable_area(&self) -> Rect {
        let top = self.chrome.top_bar_height;
        Rect::new(
            0,
            top,
            self.screen.width as i32,
            self.screen.height as i32 - top - self.chrome.dock_reserve,
        )
    }
}
