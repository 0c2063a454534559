pub mod platform;
pub mod renderer;

use anyhow::Context as _;
use log::info;

use crate::driver::InputEvent;
use crate::overlay::device::PresentationTarget;
use crate::overlay::surface::Surface;

pub use platform::Win32Platform;
pub use renderer::Dx11Renderer;

/// The immediate-mode GUI stack: imgui context plus its windowing and
/// rendering bindings.
///
/// Field order is teardown order — renderer first, then the platform
/// binding, then the context, the exact reverse of creation, because both
/// bindings assume the context still exists while they shut down.
pub struct GuiBridge {
    renderer: Dx11Renderer,
    platform: Win32Platform,
    ctx: imgui::Context,
}

impl GuiBridge {
    /// Create the context, apply the dark theme and attach both bindings.
    /// Either binding failing aborts startup; the frame driver must never
    /// run against a half-initialised GUI.
    pub fn create(surface: &Surface, target: &PresentationTarget) -> anyhow::Result<Self> {
        let mut ctx = imgui::Context::create();
        ctx.set_ini_filename(None::<std::path::PathBuf>);
        ctx.style_mut().use_dark_colors();

        let platform =
            Win32Platform::new(&mut ctx, surface).context("windowing binding failed")?;
        let renderer = Dx11Renderer::new(&mut ctx, target).context("rendering binding failed")?;

        info!("imgui context initialised");
        Ok(Self {
            renderer,
            platform,
            ctx,
        })
    }

    /// Feed one pumped window event into imgui.
    pub fn apply_input(&mut self, event: InputEvent) {
        self.platform.apply(self.ctx.io_mut(), event);
    }

    /// Start accumulating a new frame's draw commands.
    pub fn begin_frame(&mut self, surface: &Surface) -> &mut imgui::Ui {
        self.platform.prepare_frame(self.ctx.io_mut(), surface);
        self.ctx.new_frame()
    }

    /// Finalise the draw lists, composite onto the cleared backbuffer and
    /// present with a one-interval vsync wait.
    pub fn end_frame(&mut self, target: &PresentationTarget) -> anyhow::Result<()> {
        let draw_data = self.ctx.render();
        target.bind_and_clear();
        self.renderer.render(draw_data)?;
        target.present()
    }
}
