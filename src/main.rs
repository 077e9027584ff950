fn main() {
    // Run from the project root so presets.json is found regardless of where
    // the executable is launched
    std::env::set_current_dir(env!("CARGO_MANIFEST_DIR")).ok();

    vortex_field::app().run();
}
