//! Version command

use crate::domain::config::DEFAULT_MITAMAE_VERSION;

/// Run the version command.
pub fn run(json: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if json {
        println!(
            "{}",
            serde_json::json!({
                "version": version,
                "mitamae_version": DEFAULT_MITAMAE_VERSION,
            })
        );
    } else {
        println!("mitamae-provisioner {version} (mitamae {DEFAULT_MITAMAE_VERSION})");
    }
}
