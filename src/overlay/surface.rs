use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, bail};
use log::{debug, info};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Dwm::DwmExtendFrameIntoClientArea;
use windows::Win32::Graphics::Gdi::{ClientToScreen, UpdateWindow};
use windows::Win32::System::Console::GetConsoleWindow;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::MARGINS;
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    CS_HREDRAW, CS_VREDRAW, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GWL_EXSTYLE, GWLP_USERDATA, GetClientRect, GetForegroundWindow, GetSystemMetrics,
    GetWindowLongPtrW, GetWindowRect, LWA_ALPHA, MSG, PM_REMOVE, PeekMessageW, PostQuitMessage,
    RegisterClassW, SC_KEYMENU, SM_CXSCREEN, SM_CYSCREEN, SW_SHOW, SetForegroundWindow,
    SetLayeredWindowAttributes, SetWindowLongPtrW, ShowWindow, TranslateMessage, UnregisterClassW,
    WINDOW_EX_STYLE, WM_CHAR, WM_CLOSE, WM_DESTROY, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_QUIT,
    WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SYSCOMMAND, WM_SYSKEYDOWN, WM_SYSKEYUP, WNDCLASSW,
    WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};
use windows::core::PCWSTR;

use crate::driver::{InputEvent, Interaction};
use crate::overlay::config::OverlayOptions;

const CLASS_NAME: &str = "GlasspaneOverlayClass\0";

/// Extended styles for each interaction mode. Click-through is the resting
/// state: topmost, layered, input falling through to whatever is beneath.
/// Interactive keeps only the toolwindow bit (no taskbar entry) so the menu
/// can be clicked.
pub fn ex_style_for(mode: Interaction) -> WINDOW_EX_STYLE {
    match mode {
        Interaction::ClickThrough => {
            WS_EX_TOOLWINDOW | WS_EX_TRANSPARENT | WS_EX_TOPMOST | WS_EX_LAYERED
        }
        Interaction::Interactive => WS_EX_TOOLWINDOW,
    }
}

/// State reachable from the window procedure. A pointer to this lives in
/// the window's `GWLP_USERDATA` slot; the procedure translates raw messages
/// into [`InputEvent`]s and sends them here.
struct WndState {
    tx: Sender<InputEvent>,
}

/// The full-screen, borderless, layered overlay window.
///
/// Must exist before the presentation target is created and must outlive
/// it; [`crate::driver::Lifecycle`] enforces the ordering at teardown.
pub struct Surface {
    hwnd: HWND,
    hinstance: HINSTANCE,
    class_name: Vec<u16>,
    toggle_key: u16,
    events: Receiver<InputEvent>,
    wnd_state: *mut WndState,
}

impl Surface {
    /// Register the window class and create the overlay spanning the
    /// primary display. A null window handle is a hard error here — the
    /// handle feeds every later step, so startup must not continue on it.
    pub fn create(options: &OverlayOptions) -> anyhow::Result<Self> {
        unsafe {
            let hinstance: HINSTANCE = GetModuleHandleW(None)
                .context("failed to query module handle")?
                .into();
            let class_name: Vec<u16> = CLASS_NAME.encode_utf16().collect();

            let wc = WNDCLASSW {
                lpfnWndProc: Some(wnd_proc),
                hInstance: hinstance,
                lpszClassName: PCWSTR(class_name.as_ptr()),
                style: CS_HREDRAW | CS_VREDRAW,
                ..Default::default()
            };
            if RegisterClassW(&wc) == 0 {
                bail!("failed to register overlay window class");
            }

            let width = GetSystemMetrics(SM_CXSCREEN);
            let height = GetSystemMetrics(SM_CYSCREEN);
            let title: Vec<u16> = options.title.encode_utf16().chain(Some(0)).collect();

            let hwnd = CreateWindowExW(
                ex_style_for(Interaction::ClickThrough),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                WS_POPUP,
                0,
                0,
                width,
                height,
                None,
                None,
                Some(hinstance),
                None,
            )
            .context("failed to create overlay window")?;
            if hwnd.0.is_null() {
                bail!("overlay window handle is null");
            }

            let (tx, events) = mpsc::channel();
            let wnd_state = Box::into_raw(Box::new(WndState { tx }));
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, wnd_state as isize);

            // Whole-window alpha stays opaque; transparency comes from the
            // all-zero clear color in the backbuffer.
            SetLayeredWindowAttributes(hwnd, COLORREF(0), 255, LWA_ALPHA)
                .context("failed to set layered window attributes")?;

            extend_frame_into_client(hwnd)?;

            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);

            info!("overlay window created ({width}x{height})");

            Ok(Self {
                hwnd,
                hinstance,
                class_name,
                toggle_key: options.toggle_key,
                events,
                wnd_state,
            })
        }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Current client size, for the GUI's display metrics.
    pub fn client_size(&self) -> [f32; 2] {
        let mut rect = RECT::default();
        unsafe {
            let _ = GetClientRect(self.hwnd, &mut rect);
        }
        [
            (rect.right - rect.left) as f32,
            (rect.bottom - rect.top) as f32,
        ]
    }

    /// Drain all pending window messages without blocking and return the
    /// input events the window procedure queued while dispatching them.
    /// Skipping this for even a tick leaves the window unresponsive and
    /// risks the compositor flagging it as hung.
    pub fn pump_events(&mut self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    out.push(InputEvent::Quit);
                    continue;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        out.extend(self.events.try_iter());
        out
    }

    /// Rewrite the extended style bits for the given interaction mode.
    pub fn set_interaction(&mut self, mode: Interaction) {
        let style = ex_style_for(mode);
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWL_EXSTYLE, style.0 as isize);
        }
        debug!("extended style set to {:#x} for {mode:?}", style.0);
    }

    /// Raw level sample of the toggle key. Edge detection belongs to the
    /// frame driver.
    pub fn toggle_key_down(&self) -> bool {
        unsafe { (GetAsyncKeyState(self.toggle_key as i32) as u16) & 0x8000 != 0 }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
            drop(Box::from_raw(self.wnd_state));
            let _ = DestroyWindow(self.hwnd);
            let _ = UnregisterClassW(PCWSTR(self.class_name.as_ptr()), Some(self.hinstance));
            debug!("overlay window destroyed");
        }
    }
}

/// Bring the hosting console to the foreground if it isn't already, so the
/// startup hint is visible over the freshly shown overlay.
pub fn focus_console() {
    unsafe {
        let console = GetConsoleWindow();
        if console.0.is_null() || GetForegroundWindow() == console {
            return;
        }
        let _ = SetForegroundWindow(console);
    }
}

/// Extend the DWM frame across the whole client area. Without this the
/// transparent backbuffer composites against black instead of the desktop.
unsafe fn extend_frame_into_client(hwnd: HWND) -> anyhow::Result<()> {
    unsafe {
        let mut client = RECT::default();
        let mut window = RECT::default();
        GetClientRect(hwnd, &mut client).context("failed to query client area")?;
        GetWindowRect(hwnd, &mut window).context("failed to query window area")?;

        let mut diff = POINT::default();
        let _ = ClientToScreen(hwnd, &mut diff);

        let margins = MARGINS {
            cxLeftWidth: window.left + (diff.x - window.left),
            cyTopHeight: window.top + (diff.y - window.top),
            cxRightWidth: client.right,
            cyBottomHeight: client.bottom,
        };
        DwmExtendFrameIntoClientArea(hwnd, &margins).context("failed to extend DWM frame")?;
        Ok(())
    }
}

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe {
        let state = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WndState;
        if !state.is_null()
            && let Some(event) = translate_message(msg, wparam, lparam)
        {
            let _ = (*state).tx.send(event);
        }

        match msg {
            // Disable the ALT application menu; imgui claims the key.
            WM_SYSCOMMAND if (wparam.0 & 0xfff0) == SC_KEYMENU as usize => LRESULT(0),
            // The process decides its own shutdown, not the close box.
            WM_CLOSE => LRESULT(0),
            WM_DESTROY => {
                PostQuitMessage(0);
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

fn translate_message(msg: u32, wparam: WPARAM, lparam: LPARAM) -> Option<InputEvent> {
    let x = || (lparam.0 & 0xffff) as u16 as i16 as f32;
    let y = || ((lparam.0 >> 16) & 0xffff) as u16 as i16 as f32;
    match msg {
        WM_MOUSEMOVE => Some(InputEvent::MouseMove { x: x(), y: y() }),
        WM_LBUTTONDOWN => Some(InputEvent::MouseButton {
            button: 0,
            down: true,
        }),
        WM_LBUTTONUP => Some(InputEvent::MouseButton {
            button: 0,
            down: false,
        }),
        WM_RBUTTONDOWN => Some(InputEvent::MouseButton {
            button: 1,
            down: true,
        }),
        WM_RBUTTONUP => Some(InputEvent::MouseButton {
            button: 1,
            down: false,
        }),
        WM_MBUTTONDOWN => Some(InputEvent::MouseButton {
            button: 2,
            down: true,
        }),
        WM_MBUTTONUP => Some(InputEvent::MouseButton {
            button: 2,
            down: false,
        }),
        WM_MOUSEWHEEL => Some(InputEvent::Wheel {
            // High word of wparam is the wheel delta in 1/120 notches.
            delta: ((wparam.0 >> 16) & 0xffff) as u16 as i16 as f32 / 120.0,
        }),
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(InputEvent::Key {
            vk: wparam.0 as u16,
            down: true,
        }),
        WM_KEYUP | WM_SYSKEYUP => Some(InputEvent::Key {
            vk: wparam.0 as u16,
            down: false,
        }),
        WM_CHAR => char::from_u32(wparam.0 as u32).map(InputEvent::Char),
        WM_DESTROY => Some(InputEvent::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactive_style_drops_overlay_bits() {
        let style = ex_style_for(Interaction::Interactive);
        assert_eq!(style.0 & WS_EX_TOPMOST.0, 0);
        assert_eq!(style.0 & WS_EX_TRANSPARENT.0, 0);
        assert_eq!(style.0 & WS_EX_LAYERED.0, 0);
        assert_ne!(style.0 & WS_EX_TOOLWINDOW.0, 0);
    }

    #[test]
    fn click_through_style_restores_overlay_bits() {
        let style = ex_style_for(Interaction::ClickThrough);
        assert_ne!(style.0 & WS_EX_TOPMOST.0, 0);
        assert_ne!(style.0 & WS_EX_TRANSPARENT.0, 0);
        assert_ne!(style.0 & WS_EX_LAYERED.0, 0);
        assert_ne!(style.0 & WS_EX_TOOLWINDOW.0, 0);
    }

    #[test]
    fn wheel_message_converts_to_notches() {
        let wparam = WPARAM((240usize) << 16);
        let event = translate_message(WM_MOUSEWHEEL, wparam, LPARAM(0));
        assert_eq!(event, Some(InputEvent::Wheel { delta: 2.0 }));
    }

    #[test]
    fn key_messages_carry_virtual_key_and_transition() {
        let down = translate_message(WM_KEYDOWN, WPARAM(0x2E), LPARAM(0));
        assert_eq!(down, Some(InputEvent::Key { vk: 0x2E, down: true }));
        let up = translate_message(WM_KEYUP, WPARAM(0x2E), LPARAM(0));
        assert_eq!(up, Some(InputEvent::Key { vk: 0x2E, down: false }));
    }

    #[test]
    fn sys_key_messages_translate_like_plain_keys() {
        let down = translate_message(WM_SYSKEYDOWN, WPARAM(0x41), LPARAM(0));
        assert_eq!(down, Some(InputEvent::Key { vk: 0x41, down: true }));
        let up = translate_message(WM_SYSKEYUP, WPARAM(0x41), LPARAM(0));
        assert_eq!(up, Some(InputEvent::Key { vk: 0x41, down: false }));
    }

    #[test]
    fn destroy_message_requests_quit() {
        let event = translate_message(WM_DESTROY, WPARAM(0), LPARAM(0));
        assert_eq!(event, Some(InputEvent::Quit));
    }
}
