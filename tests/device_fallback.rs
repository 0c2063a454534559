use glasspane::overlay::{AdapterKind, DeviceError, create_with_fallback};

#[derive(Debug, PartialEq)]
struct FakeDevice(AdapterKind);

#[test]
fn unsupported_hardware_falls_back_to_software_once() {
    let mut attempts = Vec::new();
    let device = create_with_fallback(|kind| {
        attempts.push(kind);
        match kind {
            AdapterKind::Hardware => Err(DeviceError::Unsupported),
            AdapterKind::Software => Ok(FakeDevice(kind)),
        }
    })
    .expect("software fallback should succeed");

    assert_eq!(device, FakeDevice(AdapterKind::Software));
    assert_eq!(attempts, [AdapterKind::Hardware, AdapterKind::Software]);
}

#[test]
fn non_unsupported_failure_short_circuits() {
    let mut attempts = Vec::new();
    let result: Result<FakeDevice, _> = create_with_fallback(|kind| {
        attempts.push(kind);
        Err(DeviceError::Creation("driver removed".into()))
    });

    assert!(matches!(result, Err(DeviceError::Creation(_))));
    assert_eq!(attempts, [AdapterKind::Hardware], "no fallback attempted");
}

#[test]
fn hardware_success_never_touches_software() {
    let mut attempts = Vec::new();
    let device = create_with_fallback(|kind| {
        attempts.push(kind);
        Ok::<_, DeviceError>(FakeDevice(kind))
    })
    .expect("hardware path should succeed");

    assert_eq!(device, FakeDevice(AdapterKind::Hardware));
    assert_eq!(attempts, [AdapterKind::Hardware]);
}

#[test]
fn unsupported_on_both_paths_reports_unsupported() {
    let result: Result<FakeDevice, _> = create_with_fallback(|_| Err(DeviceError::Unsupported));
    assert_eq!(result.unwrap_err(), DeviceError::Unsupported);
}
