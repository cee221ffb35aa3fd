use defindex::Settings;
use std::env;
use std::fs;
use tempfile::TempDir;

// Single test so no other test in this binary races on the environment
#[test]
fn test_env_overrides_file_and_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(
        &config_path,
        "[index]\nrescan_interval_secs = 30\nignored_dirs = [\".git\", \"build\"]\n",
    )
    .unwrap();

    unsafe {
        // Double underscore separates nested levels
        env::set_var("DEFINDEX_INDEX__RESCAN_INTERVAL_SECS", "5");
        env::set_var("DEFINDEX_INDEX__AUTO_SAVE", "false");
        env::set_var("DEFINDEX_LOGGING__DEFAULT", "debug");
    }

    let settings = Settings::load_from(&config_path);

    unsafe {
        env::remove_var("DEFINDEX_INDEX__RESCAN_INTERVAL_SECS");
        env::remove_var("DEFINDEX_INDEX__AUTO_SAVE");
        env::remove_var("DEFINDEX_LOGGING__DEFAULT");
    }

    let settings = settings.unwrap();
    assert_eq!(settings.index.rescan_interval_secs, 5);
    assert!(!settings.index.auto_save);
    assert_eq!(settings.logging.default, "debug");
    // Values only the file sets survive
    assert_eq!(settings.index.ignored_dirs, vec![".git", "build"]);
    // Values nobody sets keep their defaults
    assert_eq!(settings.index.cache_file_name, "index.json");
}
