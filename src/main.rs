use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run()
}

#[cfg(windows)]
fn run() -> Result<()> {
    use std::thread;

    use anyhow::Context as _;
    use log::info;

    use glasspane::driver::{DrawPath, FrameDriver, InputEvent, Lifecycle};
    use glasspane::gui::GuiBridge;
    use glasspane::menu;
    use glasspane::overlay::surface::focus_console;
    use glasspane::overlay::{OverlayOptions, PresentationTarget, Surface, query_refresh_rate};

    let options = OverlayOptions::default();

    // Strict creation order: surface, then the presentation target bound
    // to it, then the GUI bindings over both. Failure anywhere aborts
    // startup; the locals drop in reverse order on the early return.
    let surface = Surface::create(&options)?;
    let refresh_hz = query_refresh_rate();
    let target = PresentationTarget::create(&surface, refresh_hz, options.clear_color)
        .context("presentation target creation failed")?;
    let gui = GuiBridge::create(&surface, &target)?;

    let mut overlay = Lifecycle::new(surface);
    overlay.attach_device(target);
    overlay.attach_gui(gui);

    info!("press Insert to toggle the menu");
    focus_console();

    let mut driver = FrameDriver::new();
    while driver.should_run {
        thread::sleep(options.tick_interval);

        let (Some(gui), Some(target), Some(surface)) = overlay.parts_mut() else {
            break;
        };

        for event in surface.pump_events() {
            match event {
                InputEvent::Quit => driver.request_exit(),
                event => gui.apply_input(event),
            }
        }

        let ui = gui.begin_frame(surface);

        // Hotkey sampling happens inside the frame, after new_frame.
        let tick = driver.tick(surface.toggle_key_down());
        if let Some(mode) = tick.style {
            surface.set_interaction(mode);
        }

        match tick.draw {
            DrawPath::Menu => menu::draw(ui, &mut driver.menu_visible),
            DrawPath::Passive => menu::draw_passive(ui),
        }
        gui.end_frame(target)?;
    }

    // GUI bridge, then presentation target, then surface.
    overlay.teardown();
    info!("overlay shut down");
    Ok(())
}

#[cfg(not(windows))]
fn run() -> Result<()> {
    anyhow::bail!("glasspane renders through Win32 and Direct3D 11; this platform is unsupported")
}
