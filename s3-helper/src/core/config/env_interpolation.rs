use std::sync::OnceLock;

use regex::Regex;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}:]+)(?::-(.*?))?\}").expect("env var pattern is a valid regex"))
}

/// Interpolate environment variables in a string
/// Supports ${VAR} and ${VAR:-default} syntax
///
/// Returns the names of the variables that are neither set nor defaulted as the error.
pub fn interpolate_env_vars(input: &str) -> Result<String, Vec<String>> {
    let mut missing_vars = Vec::new();

    let result = env_var_pattern().replace_all(input, |cap: &regex::Captures<'_>| {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(value) => value,
            Err(_) => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                None => {
                    missing_vars.push(var_name.to_string());
                    String::new()
                }
            },
        }
    });

    if !missing_vars.is_empty() {
        return Err(missing_vars);
    }

    Ok(result.into_owned())
}
