//! glasspane — a transparent, always-on-top screen overlay template.
//!
//! A thin sequence around three native subsystems: a Win32 layered window
//! ([`overlay::surface`]), a D3D11 swap chain ([`overlay::device`]) and
//! Dear ImGui ([`gui`]). The per-tick loop pumps messages, begins a GUI
//! frame, samples the Insert key to flip between click-through and
//! interactive mode, draws either the menu or a passive status line, and
//! presents against a fully transparent clear color.
//!
//! The decision logic (refresh-rate selection, adapter fallback, hotkey
//! edge detection, teardown ordering) lives in portable modules so it can
//! be tested without a display or GPU.

pub mod driver;
pub mod menu;
pub mod overlay;

#[cfg(windows)]
pub mod gui;
