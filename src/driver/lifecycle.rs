use log::debug;

/// Owns the three native subsystems and guarantees reverse-creation
/// teardown: GUI bridge first, then the presentation target, then the
/// surface. The GUI bindings reference the device and the window, and the
/// swap chain references the window, so any other order risks touching
/// freed resources.
///
/// The surface is mandatory; the device and GUI slots stay empty when
/// startup aborts partway, and tearing down a never-created device is a
/// logged no-op rather than an error.
#[derive(Debug)]
pub struct Lifecycle<G, D, S> {
    gui: Option<G>,
    device: Option<D>,
    surface: Option<S>,
}

impl<G, D, S> Lifecycle<G, D, S> {
    pub fn new(surface: S) -> Self {
        Self {
            gui: None,
            device: None,
            surface: Some(surface),
        }
    }

    pub fn attach_device(&mut self, device: D) {
        debug_assert!(self.surface.is_some(), "device attached without a surface");
        self.device = Some(device);
    }

    pub fn attach_gui(&mut self, gui: G) {
        debug_assert!(self.device.is_some(), "gui attached without a device");
        self.gui = Some(gui);
    }

    /// `None` once [`Self::teardown`] has run.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn gui_mut(&mut self) -> Option<&mut G> {
        self.gui.as_mut()
    }

    /// Split borrows for the render path, which needs the GUI bridge and
    /// the surface mutably alongside the device.
    pub fn parts_mut(&mut self) -> (Option<&mut G>, Option<&D>, Option<&mut S>) {
        (
            self.gui.as_mut(),
            self.device.as_ref(),
            self.surface.as_mut(),
        )
    }

    /// Tear everything down now, in reverse creation order. Idempotent;
    /// also runs from `Drop` for early-return failure paths.
    pub fn teardown(&mut self) {
        if self.gui.take().is_some() {
            debug!("gui bridge released");
        }
        match self.device.take() {
            Some(_) => debug!("presentation target released"),
            None => debug!("no presentation target to release"),
        }
        if self.surface.take().is_some() {
            debug!("surface released");
        }
    }
}

impl<G, D, S> Drop for Lifecycle<G, D, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
