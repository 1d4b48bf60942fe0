//! Secret reference resolver.
//!
//! Secret-bearing values in `config.toml` can point outside the file:
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and takes the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is used verbatim

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix("pass::") {
        resolve_pass(path)
    } else if let Some(var) = value.strip_prefix("env::") {
        resolve_env(var)
    } else {
        Ok(value.to_string())
    }
}

/// Returns true if `value` is a reference rather than a literal secret.
pub fn is_reference(value: &str) -> bool {
    value.starts_with("pass::") || value.starts_with("env::")
}

fn resolve_pass(path: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed (exit {}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("`pass show {}` produced no output", path))
}

fn resolve_env(var: &str) -> Result<String, String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(format!("environment variable `{}` is empty", var)),
        Err(_) => Err(format!("environment variable `{}` is not set", var)),
    }
}
