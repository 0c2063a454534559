use std::cell::RefCell;
use std::rc::Rc;

use glasspane::driver::Lifecycle;

/// Records its label when dropped.
struct Guard {
    label: &'static str,
    order: Rc<RefCell<Vec<&'static str>>>,
}

impl Drop for Guard {
    fn drop(&mut self) {
        self.order.borrow_mut().push(self.label);
    }
}

fn guard(label: &'static str, order: &Rc<RefCell<Vec<&'static str>>>) -> Guard {
    Guard {
        label,
        order: order.clone(),
    }
}

#[test]
fn teardown_runs_gui_then_device_then_surface() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut overlay = Lifecycle::new(guard("surface", &order));
    overlay.attach_device(guard("device", &order));
    overlay.attach_gui(guard("gui", &order));

    overlay.teardown();
    assert_eq!(*order.borrow(), ["gui", "device", "surface"]);
}

#[test]
fn drop_tears_down_in_the_same_order() {
    let order = Rc::new(RefCell::new(Vec::new()));
    {
        let mut overlay = Lifecycle::new(guard("surface", &order));
        overlay.attach_device(guard("device", &order));
        overlay.attach_gui(guard("gui", &order));
    }
    assert_eq!(*order.borrow(), ["gui", "device", "surface"]);
}

#[test]
fn missing_device_is_a_no_op_at_teardown() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut overlay: Lifecycle<Guard, Guard, Guard> = Lifecycle::new(guard("surface", &order));

    overlay.teardown();
    assert_eq!(*order.borrow(), ["surface"]);
}

#[test]
fn surface_accessors_empty_out_after_teardown_instead_of_panicking() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut overlay: Lifecycle<Guard, Guard, Guard> = Lifecycle::new(guard("surface", &order));
    assert!(overlay.surface().is_some());
    assert!(overlay.surface_mut().is_some());

    overlay.teardown();
    assert!(overlay.surface().is_none());
    assert!(overlay.surface_mut().is_none());
    let (gui, device, surface) = overlay.parts_mut();
    assert!(gui.is_none() && device.is_none() && surface.is_none());
}

#[test]
fn teardown_is_idempotent() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut overlay = Lifecycle::new(guard("surface", &order));
    overlay.attach_device(guard("device", &order));
    overlay.attach_gui(guard("gui", &order));

    overlay.teardown();
    overlay.teardown();
    drop(overlay);
    assert_eq!(*order.borrow(), ["gui", "device", "surface"]);
}
