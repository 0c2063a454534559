use std::time::Duration;

/// Win32 virtual-key code for Insert, the default menu toggle.
pub const VK_TOGGLE_DEFAULT: u16 = 0x2D;

/// Parameters for one overlay run. There is deliberately no file or CLI
/// surface behind this — consumers of the template construct it in code.
#[derive(Clone, Debug)]
pub struct OverlayOptions {
    /// Title given to the overlay window.
    pub title: String,
    /// Virtual-key code that toggles the menu.
    pub toggle_key: u16,
    /// Sleep between ticks. A courtesy yield to the scheduler; actual frame
    /// pacing comes from the vsync wait at present time.
    pub tick_interval: Duration,
    /// Backbuffer clear color. All-zero keeps undrawn pixels transparent.
    pub clear_color: [f32; 4],
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            title: "glasspane".to_string(),
            toggle_key: VK_TOGGLE_DEFAULT,
            tick_interval: Duration::from_millis(1),
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}
