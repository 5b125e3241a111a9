//! Template interpolation for configuration values.
//!
//! Supports the host template functions `{{ env `NAME` }}`,
//! `{{ user `name` }}`, `{{ build_name }}` and `{{ builder_type }}`.
//! Arguments may be quoted with backticks or double quotes.
//!
//! Pure functions only: the environment is passed in as a snapshot.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::unwrap_used)] // literal pattern
static TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*([A-Za-z_]+)(?:\s+(?:`([^`]*)`|"([^"]*)"))?\s*\}\}"#).unwrap()
});

/// Values available to template functions while rendering.
#[derive(Debug, Clone, Default)]
pub struct InterpolationContext {
    /// Snapshot of the environment used by `env`.
    pub env: BTreeMap<String, String>,
    /// Variables used by `user`.
    pub user_variables: BTreeMap<String, String>,
    /// Value of `build_name`.
    pub build_name: Option<String>,
    /// Value of `builder_type`.
    pub builder_type: Option<String>,
}

impl InterpolationContext {
    /// Create a context over an environment snapshot.
    #[must_use]
    pub fn with_env(env: BTreeMap<String, String>) -> Self {
        Self {
            env,
            ..Self::default()
        }
    }

    /// Render every template expression in `input`.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when a function is unknown, a
    /// required argument is missing, a user variable is undefined, or an
    /// opening `{{` is left without a matching expression.
    pub fn render(&self, input: &str) -> Result<String, String> {
        if !input.contains("{{") {
            return Ok(input.to_string());
        }

        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in TEMPLATE.captures_iter(input) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&input[last..whole.start()]);
            let func = &caps[1];
            let arg = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
            out.push_str(&self.call(func, arg)?);
            last = whole.end();
        }
        let rest = &input[last..];
        if rest.contains("{{") {
            return Err(format!("malformed template expression near {rest:?}"));
        }
        out.push_str(rest);
        Ok(out)
    }

    fn call(&self, func: &str, arg: Option<&str>) -> Result<String, String> {
        match (func, arg) {
            ("env", Some(name)) => Ok(self.env.get(name).cloned().unwrap_or_default()),
            ("user", Some(name)) => self
                .user_variables
                .get(name)
                .cloned()
                .ok_or_else(|| format!("user variable {name:?} is not defined")),
            ("build_name", None) => Ok(self.build_name.clone().unwrap_or_default()),
            ("builder_type", None) => Ok(self.builder_type.clone().unwrap_or_default()),
            ("env" | "user", None) => Err(format!("{func} requires a quoted argument")),
            ("build_name" | "builder_type", Some(_)) => {
                Err(format!("{func} does not take an argument"))
            }
            _ => Err(format!("unknown template function {func:?}")),
        }
    }
}
