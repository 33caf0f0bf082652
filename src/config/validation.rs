use super::schema::Config;
use crate::scoring::validate_policy;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (field, path) in [
        ("data.values", &config.data.values),
        ("data.directions", &config.data.directions),
        ("data.weights", &config.data.weights),
        ("data.registry", &config.data.registry),
    ] {
        if path.as_os_str().is_empty() {
            errors.push(format!("{}: path must not be empty", field));
        }
    }

    if let Some(ref policy) = config.policy {
        if let Err(policy_errors) = validate_policy(policy) {
            errors.extend(policy_errors);
        }
    }

    if let Some(ref output) = config.output {
        if output.top == Some(0) {
            errors.push("output.top: must be at least 1".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
