//! Precedence between defaults, config file, environment and overrides.

use figment::Jail;
use modbridge_config::ConfigDiscovery;
use serde::Serialize;

#[derive(Serialize)]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_paths: Option<bool>,
}

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "modbridge.toml",
            r#"
full_paths = false

[bundle]
name = "app"
"#,
        )?;
        jail.set_env("MODBRIDGE_FULL_PATHS", "true");
        jail.set_env("MODBRIDGE_BUNDLE__NAMESPACE", "blueocean");

        let config = ConfigDiscovery::new(jail.directory()).load().expect("load");
        assert!(config.full_paths);
        assert_eq!(config.registry_id(), "blueocean:app");
        Ok(())
    });
}

#[test]
fn overrides_beat_environment() {
    Jail::expect_with(|jail| {
        jail.create_file("modbridge.toml", "[bundle]\nname = \"app\"\n")?;
        jail.set_env("MODBRIDGE_FULL_PATHS", "true");

        let config = ConfigDiscovery::new(jail.directory())
            .load_with(Overrides {
                full_paths: Some(false),
            })
            .expect("load");
        assert!(!config.full_paths);
        Ok(())
    });
}

#[test]
fn unset_overrides_leave_lower_layers_alone() {
    Jail::expect_with(|jail| {
        jail.create_file("modbridge.toml", "full_paths = true\n")?;

        let config = ConfigDiscovery::new(jail.directory())
            .load_with(Overrides { full_paths: None })
            .expect("load");
        assert!(config.full_paths);
        Ok(())
    });
}

#[test]
fn load_with_tolerates_missing_file() {
    Jail::expect_with(|jail| {
        jail.set_env("MODBRIDGE_BUNDLE__NAME", "env-app");

        let config = ConfigDiscovery::new(jail.directory())
            .load_with(Overrides { full_paths: None })
            .expect("load");
        assert_eq!(config.bundle.name, "env-app");
        assert!(!config.full_paths);
        Ok(())
    });
}
