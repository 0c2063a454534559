use crate::driver::input::KeyEdge;

/// Whether the overlay window currently swallows input or lets it fall
/// through to whatever is underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Topmost, layered, click-through: the desktop behaves as if the
    /// overlay were not there.
    ClickThrough,
    /// Normal window input: the menu can be clicked.
    Interactive,
}

/// What the current tick should draw. The two paths are mutually exclusive:
/// passive background content is skipped while the menu is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPath {
    Menu,
    Passive,
}

/// Outcome of one tick of the frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// `Some` only when the interaction mode changed this tick and the
    /// window's extended styles must be rewritten.
    pub style: Option<Interaction>,
    pub draw: DrawPath,
}

/// Per-tick state machine: run flag, menu flag, toggle-key edge detection.
///
/// The driver owns the decisions; the caller owns the native calls. Each
/// loop iteration samples the toggle key, hands the level to [`tick`], and
/// applies whatever the returned [`Tick`] says.
///
/// One deliberate quirk is preserved from the reference behaviour: the
/// window styles change only on a toggle-key edge. Closing the menu through
/// its own close button flips `menu_visible` without an edge, which leaves
/// the window in the interactive style set until the key is pressed again.
///
/// [`tick`]: FrameDriver::tick
#[derive(Debug)]
pub struct FrameDriver {
    /// Process lifetime control; checked at the top of every loop iteration.
    pub should_run: bool,
    /// Whether the menu is drawn this tick. Public so the menu's close
    /// button can clear it directly.
    pub menu_visible: bool,
    toggle: KeyEdge,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            should_run: true,
            menu_visible: false,
            toggle: KeyEdge::new(),
        }
    }

    /// Advance one tick given the raw level of the toggle key.
    pub fn tick(&mut self, toggle_key_down: bool) -> Tick {
        let style = if self.toggle.rising(toggle_key_down) {
            self.menu_visible = !self.menu_visible;
            Some(self.interaction())
        } else {
            None
        };

        let draw = if self.menu_visible {
            DrawPath::Menu
        } else {
            DrawPath::Passive
        };

        Tick { style, draw }
    }

    /// Interaction mode implied by the menu flag.
    pub fn interaction(&self) -> Interaction {
        if self.menu_visible {
            Interaction::Interactive
        } else {
            Interaction::ClickThrough
        }
    }

    /// Cooperative shutdown; observed at the next loop-top check.
    pub fn request_exit(&mut self) {
        self.should_run = false;
    }
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new()
    }
}
