use std::time::Instant;

use imgui::{Io, Key};
use windows::Win32::UI::Input::KeyboardAndMouse::{GetKeyState, VK_CONTROL, VK_MENU, VK_SHIFT};

use crate::driver::InputEvent;
use crate::overlay::surface::Surface;

/// Windowing half of the GUI bridge: keeps imgui's io in sync with the
/// overlay window. Display metrics and modifier keys are sampled at frame
/// begin; pointer, key and character input arrives as [`InputEvent`]s
/// queued by the window procedure.
pub struct Win32Platform {
    last_frame: Instant,
}

impl Win32Platform {
    pub fn new(ctx: &mut imgui::Context, surface: &Surface) -> anyhow::Result<Self> {
        let size = surface.client_size();
        if size[0] <= 0.0 || size[1] <= 0.0 {
            anyhow::bail!("overlay client area is empty");
        }

        ctx.set_platform_name(Some(format!(
            "glasspane-win32 {}",
            env!("CARGO_PKG_VERSION")
        )));
        let io = ctx.io_mut();
        io.display_size = size;
        io.display_framebuffer_scale = [1.0, 1.0];

        Ok(Self {
            last_frame: Instant::now(),
        })
    }

    /// Refresh per-frame io state before `new_frame`.
    pub fn prepare_frame(&mut self, io: &mut Io, surface: &Surface) {
        let now = Instant::now();
        io.delta_time = (now - self.last_frame).as_secs_f32().max(f32::EPSILON);
        self.last_frame = now;

        io.display_size = surface.client_size();
        unsafe {
            io.add_key_event(Key::ModCtrl, GetKeyState(VK_CONTROL.0 as i32) < 0);
            io.add_key_event(Key::ModShift, GetKeyState(VK_SHIFT.0 as i32) < 0);
            io.add_key_event(Key::ModAlt, GetKeyState(VK_MENU.0 as i32) < 0);
        }
    }

    /// Apply one queued window event to imgui's io.
    pub fn apply(&mut self, io: &mut Io, event: InputEvent) {
        match event {
            InputEvent::MouseMove { x, y } => io.mouse_pos = [x, y],
            InputEvent::MouseButton { button, down } => {
                if button < io.mouse_down.len() {
                    io.mouse_down[button] = down;
                }
            }
            InputEvent::Wheel { delta } => io.mouse_wheel += delta,
            InputEvent::Key { vk, down } => {
                if let Some(key) = map_virtual_key(vk) {
                    io.add_key_event(key, down);
                }
            }
            InputEvent::Char(c) => io.add_input_character(c),
            // Lifetime control is the frame driver's concern.
            InputEvent::Quit => {}
        }
    }
}

/// Translate a Win32 virtual-key code into the matching imgui key.
///
/// Covers the keys menu widgets actually consume: text editing, navigation,
/// letters and digits. Anything else is dropped.
fn map_virtual_key(vk: u16) -> Option<Key> {
    const DIGITS: [Key; 10] = [
        Key::Alpha0,
        Key::Alpha1,
        Key::Alpha2,
        Key::Alpha3,
        Key::Alpha4,
        Key::Alpha5,
        Key::Alpha6,
        Key::Alpha7,
        Key::Alpha8,
        Key::Alpha9,
    ];
    const LETTERS: [Key; 26] = [
        Key::A,
        Key::B,
        Key::C,
        Key::D,
        Key::E,
        Key::F,
        Key::G,
        Key::H,
        Key::I,
        Key::J,
        Key::K,
        Key::L,
        Key::M,
        Key::N,
        Key::O,
        Key::P,
        Key::Q,
        Key::R,
        Key::S,
        Key::T,
        Key::U,
        Key::V,
        Key::W,
        Key::X,
        Key::Y,
        Key::Z,
    ];

    Some(match vk {
        0x08 => Key::Backspace,
        0x09 => Key::Tab,
        0x0D => Key::Enter,
        0x1B => Key::Escape,
        0x20 => Key::Space,
        0x21 => Key::PageUp,
        0x22 => Key::PageDown,
        0x23 => Key::End,
        0x24 => Key::Home,
        0x25 => Key::LeftArrow,
        0x26 => Key::UpArrow,
        0x27 => Key::RightArrow,
        0x28 => Key::DownArrow,
        0x2D => Key::Insert,
        0x2E => Key::Delete,
        0x30..=0x39 => DIGITS[(vk - 0x30) as usize],
        0x41..=0x5A => LETTERS[(vk - 0x41) as usize],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::map_virtual_key;
    use imgui::Key;

    #[test]
    fn editing_and_navigation_keys_map() {
        assert_eq!(map_virtual_key(0x08), Some(Key::Backspace));
        assert_eq!(map_virtual_key(0x0D), Some(Key::Enter));
        assert_eq!(map_virtual_key(0x25), Some(Key::LeftArrow));
    }

    #[test]
    fn letters_and_digits_map_in_order() {
        assert_eq!(map_virtual_key(0x41), Some(Key::A));
        assert_eq!(map_virtual_key(0x5A), Some(Key::Z));
        assert_eq!(map_virtual_key(0x30), Some(Key::Alpha0));
        assert_eq!(map_virtual_key(0x39), Some(Key::Alpha9));
    }

    #[test]
    fn unmapped_virtual_keys_are_dropped() {
        assert_eq!(map_virtual_key(0x00), None);
        assert_eq!(map_virtual_key(0xFF), None);
    }
}
