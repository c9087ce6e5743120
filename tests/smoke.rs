//! Basic smoke test to verify the public surface is reachable.

#[test]
fn crate_compiles() {
    let _ = std::any::type_name::<nudge::NudgeConfig>();
    let _ = std::any::type_name::<nudge::NudgeError>();
    let _ = std::any::type_name::<nudge::NudgeManager>();
    let _ = std::any::type_name::<nudge::BackgroundWorker>();
}

#[test]
fn default_config_is_valid() {
    assert!(nudge::NudgeConfig::default().validate().is_ok());
}
