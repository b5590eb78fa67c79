use std::path::PathBuf;

/// Upper-cases an identifier and joins its words with underscores
/// ("Death  Knight" -> "DEATH_KNIGHT").
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Root of everything the app keeps on disk (`~/.raidplan`).
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".raidplan"))
}
