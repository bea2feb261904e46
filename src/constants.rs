// src/constants.rs

/// The name of the directory (inside the system config dir) holding aliasctl state.
pub const APP_DIR_NAME: &str = "aliasctl";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "ALIASCTL_CONFIG_DIR";

/// The name of the alias registry document (inside the config dir).
pub const REGISTRY_FILENAME: &str = "aliases.json";

/// The name of the user settings file (inside the config dir).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// The name of the scripts folder (inside the local data dir) when settings do not override it.
pub const SCRIPTS_DIR_NAME: &str = "bin";

/// Top-level key of the alias list inside the registry document.
pub const ALIASES_KEY: &str = "aliases";

/// Key of the network interface list inside instance records.
pub const EXTRA_INTERFACES_KEY: &str = "extra_interfaces";

/// Program the generated shims hand control to unless settings say otherwise.
pub const DEFAULT_LAUNCHER: &str = "multipass";
