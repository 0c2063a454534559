use imgui::{Condition, Ui, WindowFlags};

/// Fixed menu size; layout is never persisted.
pub const MENU_SIZE: [f32; 2] = [250.0, 250.0];

const STATUS_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

/// Placeholder menu. Consumers of the template replace the body; the
/// close button clears `open` directly, which intentionally does not touch
/// the window's interaction styles (only the toggle key does).
pub fn draw(ui: &Ui, open: &mut bool) {
    ui.window("glasspane")
        .size(MENU_SIZE, Condition::Always)
        .flags(WindowFlags::NO_SAVED_SETTINGS | WindowFlags::NO_SCROLLBAR)
        .opened(open)
        .build(|| {
            ui.text("menu placeholder");
            ui.separator();
            ui.text(format!("{:.1} fps", ui.io().framerate));
        });
}

/// Passive status line drawn straight onto the background draw list while
/// the menu is hidden.
pub fn draw_passive(ui: &Ui) {
    let [width, height] = ui.io().display_size;
    ui.get_background_draw_list().add_text(
        [width * 0.5 - 70.0, height * 0.5],
        STATUS_COLOR,
        "glasspane overlay active",
    );
}
