fn main() {
    // Version resources only exist on Windows builds.
    if std::env::var_os("CARGO_CFG_WINDOWS").is_some() {
        let _ = winres::WindowsResource::new().compile();
    }
}
