/// Default base configuration file embedded in the binary
pub const DEFAULT_CONFIG: &str = include_str!("../../config.default.toml");

/// Theme collection written on first run when none exists yet
pub const DEFAULT_COLLECTION: &str = include_str!("../../templates/themes.json");

/// Prefix of environment overrides (`THEMESHIFT__BACKUP__RETENTION=10`)
pub const ENV_PREFIX: &str = "THEMESHIFT";

#[cfg(test)]
mod tests {
    use super::*;
    use engine::model::terminal::ThemeCollection;

    #[test]
    fn test_embedded_collection_is_valid() {
        let collection =
            ThemeCollection::load(DEFAULT_COLLECTION.as_bytes()).expect("valid template");
        assert!(collection.contains("Default"));
    }
}
