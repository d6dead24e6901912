/// Default snapshot destination, relative to the working directory.
pub const DEFAULT_DESTINATION: &str = "./watched.json";

/// Default autosave interval in milliseconds. Zero disables autosave.
pub const DEFAULT_SAVE_EVERY_MS: u64 = 360_000;

/// Environment variable prefix recognized by [`crate::Settings::load`].
pub const ENV_PREFIX: &str = "VIGIL";
