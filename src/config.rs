use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "rolo";

#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub contacts_path: Option<PathBuf>,
    pub keys: Keys,
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            contacts_path: None,
            keys: Keys::default(),
            ui: UiConfig::default(),
        }
    }
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

// =============================================================================
// UI Configuration
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct UiConfig {
    pub colors: UiColors,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub section_title: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
}

impl Default for UiColors {
    fn default() -> Self {
        Self {
            border: RgbColor::new(255, 165, 0),
            selection_bg: RgbColor::new(255, 165, 0),
            selection_fg: RgbColor::new(0, 0, 0),
            section_title: RgbColor::new(255, 165, 0),
            status_fg: RgbColor::new(255, 165, 0),
            status_bg: RgbColor::new(0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone, Default)]
pub struct Keys {
    /// Global keys (work outside text entry)
    pub global: GlobalKeys,
    /// Keys for the search input
    pub search_input: SearchInputKeys,
    /// Keys for the sectioned contact list
    pub list: ListKeys,
    /// Keys for the contact detail/edit dialog
    pub dialog: DialogKeys,
    /// Keys for the delete confirmation dialog
    pub confirm: ConfirmKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub quit: Vec<String>,
    pub search: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SearchInputKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ListKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub page_down: Vec<String>,
    pub page_up: Vec<String>,
    pub edit: Vec<String>,
    pub delete: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DialogKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
    pub edit: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConfirmKeys {
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
}

// =============================================================================
// Default implementations
// =============================================================================

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: vec!["q".into()],
            search: vec!["/".into()],
        }
    }
}

impl Default for SearchInputKeys {
    fn default() -> Self {
        Self {
            cancel: vec!["Escape".into()],
            confirm: vec!["Enter".into()],
            next: vec!["Down".into(), "Tab".into()],
            prev: vec!["Up".into(), "Backtab".into()],
        }
    }
}

impl Default for ListKeys {
    fn default() -> Self {
        Self {
            cancel: vec!["Escape".into()],
            confirm: vec!["Enter".into()],
            next: vec!["j".into(), "Down".into(), "Tab".into()],
            prev: vec!["k".into(), "Up".into(), "Backtab".into()],
            page_down: vec!["PageDown".into()],
            page_up: vec!["PageUp".into()],
            edit: vec!["e".into()],
            delete: vec!["x".into()],
        }
    }
}

impl Default for DialogKeys {
    fn default() -> Self {
        Self {
            cancel: vec!["Escape".into()],
            confirm: vec!["Enter".into()],
            edit: vec!["e".into()],
            next: vec!["Tab".into(), "Down".into()],
            prev: vec!["Backtab".into(), "Up".into()],
        }
    }
}

impl Default for ConfirmKeys {
    fn default() -> Self {
        Self {
            cancel: vec!["Escape".into(), "n".into()],
            confirm: vec!["Enter".into(), "y".into()],
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    global: GlobalKeysFile,
    search_input: SearchInputKeysFile,
    list: ListKeysFile,
    dialog: DialogKeysFile,
    confirm: ConfirmKeysFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GlobalKeysFile {
    quit: KeyBinding,
    search: KeyBinding,
}

impl Default for GlobalKeysFile {
    fn default() -> Self {
        let defaults = GlobalKeys::default();
        Self {
            quit: KeyBinding::Multiple(defaults.quit),
            search: KeyBinding::Multiple(defaults.search),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchInputKeysFile {
    cancel: KeyBinding,
    confirm: KeyBinding,
    next: KeyBinding,
    prev: KeyBinding,
}

impl Default for SearchInputKeysFile {
    fn default() -> Self {
        let defaults = SearchInputKeys::default();
        Self {
            cancel: KeyBinding::Multiple(defaults.cancel),
            confirm: KeyBinding::Multiple(defaults.confirm),
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListKeysFile {
    cancel: KeyBinding,
    confirm: KeyBinding,
    next: KeyBinding,
    prev: KeyBinding,
    page_down: KeyBinding,
    page_up: KeyBinding,
    edit: KeyBinding,
    delete: KeyBinding,
}

impl Default for ListKeysFile {
    fn default() -> Self {
        let defaults = ListKeys::default();
        Self {
            cancel: KeyBinding::Multiple(defaults.cancel),
            confirm: KeyBinding::Multiple(defaults.confirm),
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            page_down: KeyBinding::Multiple(defaults.page_down),
            page_up: KeyBinding::Multiple(defaults.page_up),
            edit: KeyBinding::Multiple(defaults.edit),
            delete: KeyBinding::Multiple(defaults.delete),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DialogKeysFile {
    cancel: KeyBinding,
    confirm: KeyBinding,
    edit: KeyBinding,
    next: KeyBinding,
    prev: KeyBinding,
}

impl Default for DialogKeysFile {
    fn default() -> Self {
        let defaults = DialogKeys::default();
        Self {
            cancel: KeyBinding::Multiple(defaults.cancel),
            confirm: KeyBinding::Multiple(defaults.confirm),
            edit: KeyBinding::Multiple(defaults.edit),
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfirmKeysFile {
    cancel: KeyBinding,
    confirm: KeyBinding,
}

impl Default for ConfirmKeysFile {
    fn default() -> Self {
        let defaults = ConfirmKeys::default();
        Self {
            cancel: KeyBinding::Multiple(defaults.cancel),
            confirm: KeyBinding::Multiple(defaults.confirm),
        }
    }
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        Self {
            global: GlobalKeys {
                quit: file.global.quit.into_vec(),
                search: file.global.search.into_vec(),
            },
            search_input: SearchInputKeys {
                cancel: file.search_input.cancel.into_vec(),
                confirm: file.search_input.confirm.into_vec(),
                next: file.search_input.next.into_vec(),
                prev: file.search_input.prev.into_vec(),
            },
            list: ListKeys {
                cancel: file.list.cancel.into_vec(),
                confirm: file.list.confirm.into_vec(),
                next: file.list.next.into_vec(),
                prev: file.list.prev.into_vec(),
                page_down: file.list.page_down.into_vec(),
                page_up: file.list.page_up.into_vec(),
                edit: file.list.edit.into_vec(),
                delete: file.list.delete.into_vec(),
            },
            dialog: DialogKeys {
                cancel: file.dialog.cancel.into_vec(),
                confirm: file.dialog.confirm.into_vec(),
                edit: file.dialog.edit.into_vec(),
                next: file.dialog.next.into_vec(),
                prev: file.dialog.prev.into_vec(),
            },
            confirm: ConfirmKeys {
                cancel: file.confirm.cancel.into_vec(),
                confirm: file.confirm.confirm.into_vec(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    section_title: RgbColor,
    status_fg: RgbColor,
    status_bg: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        let defaults = UiColors::default();
        Self {
            border: defaults.border,
            selection_bg: defaults.selection_bg,
            selection_fg: defaults.selection_fg,
            section_title: defaults.section_title,
            status_fg: defaults.status_fg,
            status_bg: defaults.status_bg,
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        Self {
            colors: UiColors {
                border: file.colors.border,
                selection_bg: file.colors.selection_bg,
                selection_fg: file.colors.selection_fg,
                section_title: file.colors.section_title,
                status_fg: file.colors.status_fg,
                status_bg: file.colors.status_bg,
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    contacts_path: Option<PathBuf>,
    keys: KeysFile,
    ui: UiFile,
}

// =============================================================================
// Key binding validation
// =============================================================================

fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.len() == 1 {
        // Single character: preserve case (m != M)
        trimmed.to_string()
    } else {
        // Special key names: case-insensitive
        trimmed.to_ascii_lowercase()
    }
}

/// Check for collisions within a single context
fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

/// Validate all key bindings for collisions within each context
fn validate_key_bindings(keys: &Keys) -> Result<()> {
    check_context_collisions(
        &[
            ("quit", &keys.global.quit),
            ("search", &keys.global.search),
        ],
        "global",
    )?;

    check_context_collisions(
        &[
            ("cancel", &keys.search_input.cancel),
            ("confirm", &keys.search_input.confirm),
            ("next", &keys.search_input.next),
            ("prev", &keys.search_input.prev),
        ],
        "search_input",
    )?;

    check_context_collisions(
        &[
            ("cancel", &keys.list.cancel),
            ("confirm", &keys.list.confirm),
            ("next", &keys.list.next),
            ("prev", &keys.list.prev),
            ("page_down", &keys.list.page_down),
            ("page_up", &keys.list.page_up),
            ("edit", &keys.list.edit),
            ("delete", &keys.list.delete),
        ],
        "list",
    )?;

    check_context_collisions(
        &[
            ("cancel", &keys.dialog.cancel),
            ("confirm", &keys.dialog.confirm),
            ("edit", &keys.dialog.edit),
            ("next", &keys.dialog.next),
            ("prev", &keys.dialog.prev),
        ],
        "dialog",
    )?;

    check_context_collisions(
        &[
            ("cancel", &keys.confirm.cancel),
            ("confirm", &keys.confirm.confirm),
        ],
        "confirm",
    )?;

    Ok(())
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn warn_unknown_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let known = HashSet::from(["contacts_path".to_string(), "keys".to_string(), "ui".to_string()]);

    for key in table.keys() {
        if !known.contains(key) {
            eprintln!("warning: unknown configuration key `{}`", key);
        }
    }

    if let Some(keys_val) = table.get("keys") {
        warn_unknown_keys_section(keys_val);
    }

    if let Some(ui_val) = table.get("ui") {
        warn_unknown_ui_keys(ui_val);
    }
}

fn warn_unknown_keys_section(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let known_contexts = HashSet::from(["global", "search_input", "list", "dialog", "confirm"]);

    for key in table.keys() {
        if !known_contexts.contains(key.as_str()) {
            eprintln!("warning: unknown keys.* context `{}`", key);
        }
    }

    if let Some(v) = table.get("global") {
        warn_unknown_in_context(v, "global", &["quit", "search"]);
    }
    if let Some(v) = table.get("search_input") {
        warn_unknown_in_context(v, "search_input", &["cancel", "confirm", "next", "prev"]);
    }
    if let Some(v) = table.get("list") {
        warn_unknown_in_context(
            v,
            "list",
            &[
                "cancel",
                "confirm",
                "next",
                "prev",
                "page_down",
                "page_up",
                "edit",
                "delete",
            ],
        );
    }
    if let Some(v) = table.get("dialog") {
        warn_unknown_in_context(v, "dialog", &["cancel", "confirm", "edit", "next", "prev"]);
    }
    if let Some(v) = table.get("confirm") {
        warn_unknown_in_context(v, "confirm", &["cancel", "confirm"]);
    }
}

fn warn_unknown_in_context(value: &toml::Value, context: &str, known: &[&str]) {
    let Some(table) = value.as_table() else {
        return;
    };
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            eprintln!("warning: unknown key `keys.{}.{}`", context, key);
        }
    }
}

fn warn_unknown_ui_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    for key in table.keys() {
        if key != "colors" {
            eprintln!("warning: unknown key `ui.{}`", key);
        }
    }

    if let Some(colors) = table.get("colors").and_then(|v| v.as_table()) {
        let known = [
            "border",
            "selection_bg",
            "selection_fg",
            "section_title",
            "status_fg",
            "status_bg",
        ];
        for key in colors.keys() {
            if !known.contains(&key.as_str()) {
                eprintln!("warning: unknown key `ui.colors.{}`", key);
            }
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load configuration from `override_path` or the platform config directory.
/// A missing file yields full defaults; a present file must parse.
pub fn load(override_path: Option<&Path>) -> Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    if !path.exists() {
        return Ok(Config {
            config_path: path,
            ..Config::default()
        });
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    parse_config(&raw, &path)
}

fn parse_config(raw: &str, path: &Path) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw)
        .with_context(|| format!("failed to parse {} as TOML", path.display()))?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", path.display()))?;

    let keys: Keys = cfg_file.keys.into();
    validate_key_bindings(&keys)?;

    let contacts_path = cfg_file.contacts_path.map(|p| expand_tilde(&p));

    Ok(Config {
        config_path: path.to_path_buf(),
        contacts_path,
        keys,
        ui: cfg_file.ui.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Config> {
        parse_config(raw, Path::new("test-config.toml"))
    }

    #[test]
    fn test_empty_config_yields_defaults() {
        let config = parse("").unwrap();
        assert!(config.contacts_path.is_none());
        assert_eq!(config.keys.global.quit, vec!["q".to_string()]);
        assert_eq!(config.keys.list.delete, vec!["x".to_string()]);
        assert_eq!(config.ui.colors.border.r, 255);
    }

    #[test]
    fn test_key_binding_single_string_and_array() {
        let config = parse(
            r#"
[keys.global]
quit = "Q"

[keys.list]
delete = ["x", "Delete"]
"#,
        )
        .unwrap();
        assert_eq!(config.keys.global.quit, vec!["Q".to_string()]);
        assert_eq!(
            config.keys.list.delete,
            vec!["x".to_string(), "Delete".to_string()]
        );
        // untouched contexts keep defaults
        assert_eq!(config.keys.confirm.confirm, vec!["Enter".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_key_binding_collision_rejected() {
        let err = parse(
            r#"
[keys.list]
edit = "x"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("collision"));
    }

    #[test]
    fn test_collision_check_is_case_insensitive_for_special_keys() {
        let err = parse(
            r#"
[keys.confirm]
cancel = "ESCAPE"
confirm = ["Enter", "escape"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("[keys.confirm]"));
    }

    #[test]
    fn test_rgb_color_array_and_map_forms() {
        let config = parse(
            r#"
[ui.colors]
border = [10, 20, 30]
status_bg = { r = 1, g = 2, b = 3 }
"#,
        )
        .unwrap();
        assert_eq!(config.ui.colors.border.g, 20);
        assert_eq!(config.ui.colors.status_bg.b, 3);
        // unspecified colors keep defaults
        assert_eq!(config.ui.colors.selection_fg.r, 0);
    }

    #[test]
    fn test_contacts_path_parsed() {
        let config = parse(r#"contacts_path = "/tmp/contacts.json""#).unwrap();
        assert_eq!(
            config.contacts_path,
            Some(PathBuf::from("/tmp/contacts.json"))
        );
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(Path::new("~/contacts.json"));
        assert!(!expanded.starts_with("~"));
        assert_eq!(
            expand_tilde(Path::new("/abs/contacts.json")),
            PathBuf::from("/abs/contacts.json")
        );
    }

    #[test]
    fn test_unknown_keys_do_not_fail() {
        let config = parse(
            r#"
mystery = true

[keys.list]
warp = "w"
"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_normalize_binding_preserves_single_char_case() {
        assert_eq!(normalize_binding("M"), "M");
        assert_eq!(normalize_binding("m"), "m");
        assert_eq!(normalize_binding(" Escape "), "escape");
    }
}
