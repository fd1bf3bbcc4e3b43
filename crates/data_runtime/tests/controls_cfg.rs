use data_runtime::configs::controls::load_default;

#[test]
fn env_overrides_parse() {
    unsafe {
        std::env::set_var("DOME_SENS_DEG", "0.2");
        std::env::set_var("DOME_INVERT_Y", "true");
        std::env::set_var("DOME_BASE_SPEED", "4.5");
        std::env::set_var("DOME_EYE_HEIGHT", "1.6");
        std::env::set_var("DOME_FLY", "true");
        std::env::set_var("DOME_MAX_DT", "0.25");
    }
    let cfg = load_default().expect("load");
    assert_eq!(cfg.sensitivity_deg_per_px, Some(0.2));
    assert_eq!(cfg.invert_y, Some(true));
    assert_eq!(cfg.base_speed_mps, Some(4.5));
    assert_eq!(cfg.eye_height_m, Some(1.6));
    assert_eq!(cfg.fly_mode, Some(true));
    assert_eq!(cfg.max_frame_dt_s, Some(0.25));
}
