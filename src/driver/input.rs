/// Edge-triggered key sampler.
///
/// The frame driver polls the toggle key far faster than a human can press
/// it, so the raw "is the key down" level is useless on its own — a single
/// press would toggle the menu on every tick it stays held. `KeyEdge`
/// remembers the previous sample and reports only the up→down transition.
#[derive(Debug, Default)]
pub struct KeyEdge {
    was_down: bool,
}

impl KeyEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current key level; returns `true` only on a fresh press.
    pub fn rising(&mut self, now_down: bool) -> bool {
        let edge = now_down && !self.was_down;
        self.was_down = now_down;
        edge
    }
}

/// Input event delivered from the window procedure to the GUI.
///
/// The window procedure runs as a C callback with no direct access to the
/// imgui context, so it translates the raw messages into these and sends
/// them over a channel; the platform layer applies them at frame begin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseMove { x: f32, y: f32 },
    /// Button index follows imgui's convention: 0 left, 1 right, 2 middle.
    MouseButton { button: usize, down: bool },
    /// Scroll in wheel notches, positive away from the user.
    Wheel { delta: f32 },
    /// Virtual-key transition, `vk` in the Win32 VK_* numbering.
    Key { vk: u16, down: bool },
    Char(char),
    /// The window was destroyed; the run loop should stop.
    Quit,
}

#[cfg(test)]
mod tests {
    use super::KeyEdge;

    #[test]
    fn fresh_press_fires_once() {
        let mut edge = KeyEdge::new();
        assert!(edge.rising(true));
        assert!(!edge.rising(true));
        assert!(!edge.rising(true));
    }

    #[test]
    fn release_rearms() {
        let mut edge = KeyEdge::new();
        assert!(edge.rising(true));
        assert!(!edge.rising(false));
        assert!(edge.rising(true));
    }

    #[test]
    fn idle_never_fires() {
        let mut edge = KeyEdge::new();
        for _ in 0..100 {
            assert!(!edge.rising(false));
        }
    }
}
