use super::load_config;
use super::settings::Settings;

#[test]
fn default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.log.level, "info");
}

#[test]
fn environment_overrides_defaults() {
    temp_env::with_var("SERVER_PORT", Some("9100"), || {
        let settings = load_config().expect("config should load");
        assert_eq!(settings.server.port, 9100);
        // Untouched fields keep their defaults.
        assert_eq!(settings.server.host, "127.0.0.1");
    });
}
