use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Color scheme of the preview pane and exported HTML.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreviewTheme {
    #[default]
    System,
    Light,
    Dark,
}

impl PreviewTheme {
    /// Next theme in the System → Light → Dark cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::System => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_editor: bool,
    pub no_raw: bool,
    pub no_preview: bool,
    pub highlight: bool,
    pub theme: Option<PreviewTheme>,
    pub renderer_init_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_editor: self.no_editor || other.no_editor,
            no_raw: self.no_raw || other.no_raw,
            no_preview: self.no_preview || other.no_preview,
            highlight: self.highlight || other.highlight,
            theme: other.theme.or(self.theme),
            renderer_init_ms: other.renderer_init_ms.or(self.renderer_init_ms),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

fn config_root() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Some(PathBuf::from(appdata).join("tripane"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("tripane"),
            );
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join("tripane"));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config").join("tripane"));
        }
    }

    None
}

pub fn global_config_path() -> PathBuf {
    config_root().map_or_else(local_override_path, |root| root.join("config"))
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".tripanerc")
}

/// Where the last-directory bookmark is kept.
pub fn bookmark_path() -> PathBuf {
    config_root().map_or_else(
        || PathBuf::from(".tripane-bookmark.json"),
        |root| root.join("last_directory.json"),
    )
}

/// Directory used when no bookmark can be resolved:
/// `$HOME/Documents`, else `$HOME`, else the working directory.
pub fn default_directory() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from);
    match home {
        Some(home) => {
            let documents = home.join("Documents");
            if documents.is_dir() {
                documents
            } else if home.is_dir() {
                home
            } else {
                PathBuf::from(".")
            }
        }
        None => PathBuf::from("."),
    }
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# tripane defaults (saved with --save)".to_string());
    if flags.no_editor {
        lines.push("--no-editor".to_string());
    }
    if flags.no_raw {
        lines.push("--no-raw".to_string());
    }
    if flags.no_preview {
        lines.push("--no-preview".to_string());
    }
    if flags.highlight {
        lines.push("--highlight".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if let Some(ms) = flags.renderer_init_ms {
        lines.push(format!("--renderer-init-ms {ms}"));
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--no-editor" => flags.no_editor = true,
            "--no-raw" => flags.no_raw = true,
            "--no-preview" => flags.no_preview = true,
            "--highlight" => flags.highlight = true,
            "--theme" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.theme = parse_theme(next);
                    i += 1;
                }
            }
            "--renderer-init-ms" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.renderer_init_ms = next.parse().ok();
                    i += 1;
                }
            }
            "--log-file" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.log_file = Some(PathBuf::from(next));
                    i += 1;
                }
            }
            _ => {
                if let Some(value) = token.strip_prefix("--theme=") {
                    flags.theme = parse_theme(value);
                } else if let Some(value) = token.strip_prefix("--renderer-init-ms=") {
                    flags.renderer_init_ms = value.parse().ok();
                } else if let Some(value) = token.strip_prefix("--log-file=") {
                    flags.log_file = Some(PathBuf::from(value));
                }
            }
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<PreviewTheme> {
    match s {
        "system" => Some(PreviewTheme::System),
        "light" => Some(PreviewTheme::Light),
        "dark" => Some(PreviewTheme::Dark),
        _ => None,
    }
}
