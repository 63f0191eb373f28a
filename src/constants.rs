// src/constants.rs

/// Marker placed on both sides of a key to form a template placeholder (`@@@KEY@@@`).
pub const PLACEHOLDER_DELIMITER: &str = "@@@";

/// Field separator of the resources profile (`TYPE_____Name_____Template`).
pub const RESOURCE_FIELD_DELIMITER: &str = "_____";

/// Number of fields every resource line must have.
pub const RESOURCE_FIELD_COUNT: usize = 3;

/// Lines starting with this character are ignored in every profile format.
pub const COMMENT_PREFIX: char = '#';

/// Framework defaults, relative to the install root.
pub const FRAMEWORK_CONFIG_FILE: &str = "framework/config/framework_config.cfg";

/// Key holding the install root. Also usable as a placeholder in config files.
pub const FRAMEWORK_DIR_KEY: &str = "FRAMEWORK_DIR";

/// Target key used for auxiliary runs, which have no URL.
pub const AUX_TARGET: &str = "aux";

pub const WEB_PLUGIN_GROUP: &str = "web";
pub const AUX_PLUGIN_GROUP: &str = "aux";

/// Every plugin group installed with the framework, in load order.
pub const PLUGIN_GROUPS: &[&str] = &[WEB_PLUGIN_GROUP, "net", AUX_PLUGIN_GROUP];

/// Installed plugins, relative to the install root: `<PLUGINS_DIR>/<group>/`.
pub const PLUGINS_DIR: &str = "plugins";

/// Environment variable naming the install root when `--root` is not given.
pub const ROOT_ENV_VAR: &str = "TARGETCFG_ROOT";

/// Profile types and the config key holding the default file for each.
pub const DEFAULT_PROFILES: &[(&str, &str)] = &[
    (GENERAL_PROFILE, "DEFAULT_GENERAL_PROFILE"),
    ("net", "DEFAULT_NET_PLUGIN_ORDER_PROFILE"),
    ("web", "DEFAULT_WEB_PLUGIN_ORDER_PROFILE"),
    (RESOURCES_PROFILE, "DEFAULT_RESOURCES_PROFILE"),
];

/// Profile type of the general config overlay.
pub const GENERAL_PROFILE: &str = "g";

/// Profile type of the resources file.
pub const RESOURCES_PROFILE: &str = "r";

/// Config key naming the command used for hostname lookups.
pub const DNS_LOOKUP_COMMAND_KEY: &str = "DNS_LOOKUP_COMMAND";

/// Lookup command used when `DNS_LOOKUP_COMMAND` is not configured.
pub const DEFAULT_DNS_LOOKUP_COMMAND: &str = "host";
