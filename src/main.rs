#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging for development
    env_logger::init();

    // Document exports and save dialogs run on this runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    // Run the diagram viewer
    ticket_diagrams::run_app()?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build starts through `ticket_diagrams::start`
}
