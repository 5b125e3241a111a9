//! Property-based tests for configuration defaults and command composition.

use mitamae_provisioner::domain::command::{download_url, install_path, recipe_command};
use mitamae_provisioner::domain::config::{DEFAULT_BIN_DIR, DEFAULT_MITAMAE_VERSION};
use mitamae_provisioner::domain::{InterpolationContext, ProvisionerConfig, RawConfig};
use proptest::prelude::*;
use serde_json::Value;

fn raw(pairs: &[(&str, &str)]) -> RawConfig {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect()
}

proptest! {
    #[test]
    fn prop_defaults_fill_unset_fields(recipe in "[a-z][a-z0-9_/]{0,20}\\.rb") {
        let cfg = ProvisionerConfig::prepare(
            &[raw(&[("recipe_path", &recipe)])],
            &InterpolationContext::default(),
        );
        prop_assert!(cfg.is_ok());
        let cfg = cfg.unwrap_or_else(|e| panic!("{e}"));
        prop_assert_eq!(cfg.bin_dir, DEFAULT_BIN_DIR);
        prop_assert_eq!(cfg.mitamae_version, DEFAULT_MITAMAE_VERSION);
        prop_assert_eq!(cfg.recipe_path, recipe);
    }

    #[test]
    fn prop_recipe_command_shape(
        dir in "/[a-z]{1,8}(/[a-z]{1,8}){0,2}",
        arch in "(x86_64|aarch64|arm64|i386)",
        os in "(linux|darwin)",
        option in "(|--dry-run|--log-level debug)",
        recipe in "[a-z]{1,10}\\.rb",
    ) {
        let artifact = format!("mitamae-{arch}-{os}");
        let binary = install_path(&dir, &artifact);
        let cmd = recipe_command(&binary, &option, &recipe);
        prop_assert_eq!(cmd, format!("{dir}/{artifact} local {option} {recipe}"));
    }

    #[test]
    fn prop_download_url_ends_with_version_and_artifact(
        version in "v[0-9]\\.[0-9]{1,2}\\.[0-9]{1,2}",
        arch in "(x86_64|aarch64)",
    ) {
        let artifact = format!("mitamae-{arch}-linux");
        let url = download_url(&version, &artifact);
        prop_assert!(url.starts_with("https://github.com/itamae-kitchen/mitamae/releases/download/"));
        let expected_suffix = format!("/{version}/{artifact}");
        prop_assert!(url.ends_with(&expected_suffix));
    }
}
