use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub inputs: Option<Vec<String>>,
    pub input_dir: Option<String>,
    pub overview: Option<String>,
    pub announce: Option<String>,
    pub output: Option<String>,
    pub output_dir: Option<String>,
    pub output_format: Option<String>,
    #[serde(alias = "static_file_uri")]
    pub static_base: Option<String>,
    pub concurrency: Option<usize>,
    pub workers: Option<usize>,
    pub failed_log: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".kcbtrack").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

fn default_config_yaml() -> String {
    r#"# kcbtrack config
#
# Location (default):
#   ~/.kcbtrack/config.yml

# Inputs (choose at least one): saved disclosure payloads, raw JSON or JSONP
# inputs:
#   - ./payloads/942.json
# input_dir: ./payloads
# Company overview payload applied to single-file runs.
# Directory runs pick up <name>.overview.json next to each <name>.json.
# overview: ./payloads/942.overview.json
# Listing-committee meeting announcements, paired the same way as
# <name>.announce.json.
# announce: ./payloads/942.announce.json

# Output (optional, defaults to text on stdout)
# output: ./report.html
# output_dir: ./out
# output_format: html

# Document links are static_base + filePath
static_base: http://static.sse.com.cn/stock

# Performance
concurrency: 4
workers: 2

# Inputs that fail to decode are listed here
# failed_log: ./failed_logs.txt

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
