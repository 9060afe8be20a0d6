//! Editor configuration and the shared context handed to editors.
//!
//! There is no global state: whatever several editors of one plugin instance
//! share (the parameter registry, UI settings, the UI-thread scheduler) lives
//! in a [`SharedContext`] created at startup and passed in explicitly.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::geometry::Size;
use crate::param::ParameterRegistry;
use crate::reactive::Observable;
use crate::scheduler::Scheduler;

// ---------------------------------------------------------------------------
// EditorConfig
// ---------------------------------------------------------------------------

/// Configuration for one editor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Optional window title.
    pub title: Option<String>,
    /// Stylesheet text; `None` uses the built-in defaults only.
    pub stylesheet: Option<String>,
    /// UI ticks per second.
    pub refresh_rate: u32,
    /// Initial editor size in logical pixels.
    pub size: Size,
    /// Palette to activate after the stylesheet loads.
    pub palette: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            title: None,
            stylesheet: None,
            refresh_rate: 30,
            size: Size::new(600.0, 400.0),
            palette: None,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the stylesheet text (builder).
    pub fn with_stylesheet(mut self, css: impl Into<String>) -> Self {
        self.stylesheet = Some(css.into());
        self
    }

    /// Set the refresh rate in Hz (builder). Clamped to at least 1.
    pub fn with_refresh_rate(mut self, hz: u32) -> Self {
        self.refresh_rate = hz.max(1);
        self
    }

    /// Set the initial size (builder).
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Set the palette to activate (builder).
    pub fn with_palette(mut self, palette: impl Into<String>) -> Self {
        self.palette = Some(palette.into());
        self
    }

    /// Time between two ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_rate.max(1)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// UI settings observed by every editor of a plugin instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Flags that switch `active` style classes on.
    pub flags: BTreeSet<String>,
    /// Name of the palette `$name` references resolve against.
    pub palette: Option<String>,
}

// ---------------------------------------------------------------------------
// SharedContext
// ---------------------------------------------------------------------------

/// State shared by the editors of one plugin instance. UI thread only;
/// clones share the same settings and scheduler.
#[derive(Clone)]
pub struct SharedContext {
    registry: Arc<dyn ParameterRegistry>,
    settings: Observable<Settings>,
    scheduler: Scheduler,
}

impl SharedContext {
    pub fn new(registry: Arc<dyn ParameterRegistry>) -> Self {
        Self {
            registry,
            settings: Observable::new(Settings::default()),
            scheduler: Scheduler::new(),
        }
    }

    pub fn registry(&self) -> Arc<dyn ParameterRegistry> {
        Arc::clone(&self.registry)
    }

    /// Settings; subscribe to follow changes made by other editors.
    pub fn settings(&self) -> &Observable<Settings> {
        &self.settings
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Turn a UI flag on or off. Returns `true` if it changed.
    pub fn set_flag(&self, flag: &str, on: bool) -> bool {
        self.settings.update(|s| {
            if on {
                s.flags.insert(flag.to_owned());
            } else {
                s.flags.remove(flag);
            }
        })
    }

    /// Select the active palette. Returns `true` if it changed.
    pub fn set_palette(&self, palette: impl Into<String>) -> bool {
        let palette = palette.into();
        self.settings.update(|s| s.palette = Some(palette))
    }
}

impl fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedContext")
            .field("settings", &self.settings.get())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
