//! Composition of the remote shell commands and the release download URL.
//!
//! The remote channel accepts a single shell string, so every value that is
//! spliced into a command is quoted unless it only contains characters the
//! shell treats literally. The user's `option` string is the exception: it is
//! a flag list and is passed through verbatim.

use std::borrow::Cow;

/// Base URL of mitamae GitHub release downloads.
pub const RELEASE_BASE_URL: &str = "https://github.com/itamae-kitchen/mitamae/releases/download";

/// `https://github.com/itamae-kitchen/mitamae/releases/download/<version>/<artifact>`
#[must_use]
pub fn download_url(version: &str, artifact: &str) -> String {
    format!("{RELEASE_BASE_URL}/{version}/{artifact}")
}

/// Path of the installed artifact on the target.
#[must_use]
pub fn install_path(bin_dir: &str, artifact: &str) -> String {
    format!("{}/{artifact}", bin_dir.trim_end_matches('/'))
}

/// Fetch `url` into `path` and mark it executable. `chmod` only runs when
/// the fetch succeeded.
#[must_use]
pub fn download_command(url: &str, path: &str) -> String {
    let path = shell_quote(path);
    format!(
        "wget -q -O {path} {url} && chmod +x {path}",
        url = shell_quote(url)
    )
}

/// `<binary> local <option> <recipe_path>`.
///
/// An empty option leaves a double space, which the shell ignores.
#[must_use]
pub fn recipe_command(binary: &str, option: &str, recipe_path: &str) -> String {
    format!(
        "{} local {option} {}",
        shell_quote(binary),
        shell_quote(recipe_path)
    )
}

/// Quote `value` for a POSIX shell when it contains anything beyond a
/// conservative set of literal characters.
#[must_use]
pub fn shell_quote(value: &str) -> Cow<'_, str> {
    let literal = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:@%+=,".contains(c));
    if literal {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', r"'\''")))
    }
}
