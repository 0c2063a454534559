use glasspane::driver::{DrawPath, FrameDriver, Interaction};

#[test]
fn held_key_toggles_exactly_once() {
    let mut driver = FrameDriver::new();
    let mut toggles = 0;
    for _ in 0..50 {
        if driver.tick(true).style.is_some() {
            toggles += 1;
        }
    }
    assert_eq!(toggles, 1);
    assert!(driver.menu_visible);
}

#[test]
fn press_release_press_toggles_twice() {
    let mut driver = FrameDriver::new();
    assert!(driver.tick(true).style.is_some());
    assert!(driver.tick(false).style.is_none());
    assert!(driver.tick(true).style.is_some());
    assert!(!driver.menu_visible);
}

#[test]
fn idle_tick_takes_passive_path_without_style_change() {
    let mut driver = FrameDriver::new();
    let tick = driver.tick(false);
    assert_eq!(tick.style, None);
    assert_eq!(tick.draw, DrawPath::Passive);
    assert!(!driver.menu_visible);
}

// The three-tick scenario: no key, fresh edge, key still held.
#[test]
fn toggle_scenario_edge_then_hold() {
    let mut driver = FrameDriver::new();
    assert!(driver.should_run);

    let tick = driver.tick(false);
    assert_eq!(tick.style, None);
    assert_eq!(tick.draw, DrawPath::Passive);

    let tick = driver.tick(true);
    assert_eq!(tick.style, Some(Interaction::Interactive));
    assert_eq!(tick.draw, DrawPath::Menu);
    assert!(driver.menu_visible);

    let tick = driver.tick(true);
    assert_eq!(tick.style, None);
    assert!(driver.menu_visible);
}

#[test]
fn toggling_back_restores_click_through() {
    let mut driver = FrameDriver::new();
    assert_eq!(driver.tick(true).style, Some(Interaction::Interactive));
    driver.tick(false);
    assert_eq!(driver.tick(true).style, Some(Interaction::ClickThrough));
}

// Design inconsistency carried over from the reference behaviour: the menu's
// own close button clears the visible flag without a key edge, so the window
// keeps the interactive style set until the toggle key is pressed again. The
// next tick silently switches to the passive draw path with stale styles.
#[test]
fn closing_menu_from_its_own_button_leaves_styles_stale() {
    let mut driver = FrameDriver::new();
    assert_eq!(driver.tick(true).style, Some(Interaction::Interactive));
    driver.tick(false);

    // The close button does this between frames.
    driver.menu_visible = false;

    let tick = driver.tick(false);
    assert_eq!(tick.draw, DrawPath::Passive);
    assert_eq!(tick.style, None, "no style resync happens on menu close");

    // The next key press re-evaluates from the flag, restoring click-through.
    assert_eq!(driver.tick(true).style, Some(Interaction::Interactive));
}

#[test]
fn exit_request_clears_run_flag() {
    let mut driver = FrameDriver::new();
    assert!(driver.should_run);
    driver.request_exit();
    assert!(!driver.should_run);
}
