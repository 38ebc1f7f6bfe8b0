//! Value parsers for CLI arguments

use std::fs;
use std::path::PathBuf;

/// Validate that a file path exists and is readable
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}

/// Parse a `KEY=VALUE` override; the value may be empty or contain `=`
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got: '{}'", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Parameter key cannot be empty: '{}'", raw));
    }

    Ok((key.to_lowercase(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("Priority=high").unwrap(),
            ("priority".to_string(), "high".to_string())
        );
        assert_eq!(
            parse_param("click=https://x.org/?a=b").unwrap(),
            ("click".to_string(), "https://x.org/?a=b".to_string())
        );
        assert_eq!(parse_param("title=").unwrap().1, "");
        assert!(parse_param("title").is_err());
        assert!(parse_param(" =value").is_err());
    }

    #[test]
    fn test_validate_config_file_path() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(validate_config_file_path(path).unwrap(), file.path());

        let dir = file.path().parent().unwrap().to_str().unwrap();
        assert!(validate_config_file_path(dir).unwrap_err().contains("not a file"));
        assert!(validate_config_file_path("/definitely/not/here.toml").is_err());
    }
}
