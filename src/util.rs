use chrono::{DateTime, Utc};

/// Expands a leading `~` in a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let rest = path[1..].trim_start_matches('/');
            if rest.is_empty() {
                return home.to_string_lossy().to_string();
            }
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}

/// Parses a timestamp header. Open Cloud sends ISO 8601 (RFC 3339) for most headers,
/// but `last-modified` may come back as an HTTP date.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(expand_tilde("/etc/config.json"), "/etc/config.json");
        assert_eq!(expand_tilde("relative/~/path"), "relative/~/path");
    }

    #[test]
    fn test_expand_tilde_home() {
        if let Some(home) = dirs::home_dir() {
            let expanded = expand_tilde("~/.rbx-open-cloud/config.json");
            assert!(expanded.starts_with(&*home.to_string_lossy()));
            assert!(expanded.ends_with("config.json"));
            assert!(!expanded.contains('~'));
        }
    }

    #[test]
    fn test_parse_rfc3339_with_fraction() {
        let ts = parse_timestamp("2022-02-02T23:30:06.5388799+00:00").unwrap();
        assert_eq!(ts.timestamp(), 1643844606);
    }

    #[test]
    fn test_parse_http_date() {
        let ts = parse_timestamp("Wed, 02 Feb 2022 23:30:06 GMT").unwrap();
        assert_eq!(ts.timestamp(), 1643844606);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}
