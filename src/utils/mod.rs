use std::fmt;

use colored::{ColoredString, Colorize};
use indicatif::ProgressBar;
use serde::de::{self, Deserializer, Visitor};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    fn tag(self) -> ColoredString {
        match self {
            Level::Error => "ERR".bold().red(),
            Level::Warn => "WRN".bold().yellow(),
            Level::Info => "INF".bold().cyan(),
            Level::Debug => "DBG".bold().magenta(),
        }
    }
}

pub fn tagged(level: Level, msg: &str) -> String {
    format!(
        "{}{}{} {}",
        "[".bold().white(),
        level.tag(),
        "]".bold().white(),
        msg.white()
    )
}

/// Console lines go to stderr (or through the progress bar while one is
/// drawing) so rendered reports on stdout stay clean.
#[derive(Clone, Debug)]
pub struct Console {
    verbose: u8,
    pb: Option<ProgressBar>,
}

impl Console {
    pub fn new(verbose: u8) -> Self {
        Self { verbose, pb: None }
    }

    pub fn with_progress(&self, pb: ProgressBar) -> Self {
        Self {
            verbose: self.verbose,
            pb: Some(pb),
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        level != Level::Debug || self.verbose > 0
    }

    pub fn line(&self, level: Level, msg: impl AsRef<str>) {
        if !self.enabled(level) {
            return;
        }
        let line = tagged(level, msg.as_ref());
        match self.pb.as_ref() {
            Some(pb) if !pb.is_hidden() => pb.println(line),
            _ => eprintln!("{}", line),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.line(Level::Info, msg)
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.line(Level::Warn, msg)
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.line(Level::Error, msg)
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        self.line(Level::Debug, msg)
    }
}

pub fn format_kv_line(label: &str, value: &str) -> String {
    format!(":: {:<12}: {}", label, value)
}

/// Character-indexed substring with clamped bounds, so short input yields
/// short pieces instead of panicking.
pub fn clamped_substring(value: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    value.chars().skip(start).take(end - start).collect()
}

struct CodeVisitor;

impl<'de> Visitor<'de> for CodeVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or number code")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(CodeVisitor)
    }
}

/// Backend codes arrive as either `30` or `"30"`; both become `"30"`.
pub fn de_opt_code<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_any(CodeVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "de_opt_code")]
        code: Option<String>,
    }

    fn probe(json: &str) -> Option<String> {
        serde_json::from_str::<Probe>(json).unwrap().code
    }

    #[test]
    fn codes_accept_numbers_and_strings() {
        assert_eq!(probe(r#"{"code":30}"#), Some("30".to_string()));
        assert_eq!(probe(r#"{"code":"30"}"#), Some("30".to_string()));
        assert_eq!(probe(r#"{"code":""}"#), Some(String::new()));
        assert_eq!(probe(r#"{"code":null}"#), None);
        assert_eq!(probe(r#"{}"#), None);
    }

    #[test]
    fn clamped_substring_handles_short_input() {
        assert_eq!(clamped_substring("20230115", 0, 4), "2023");
        assert_eq!(clamped_substring("20230115", 6, 8), "15");
        assert_eq!(clamped_substring("2023", 4, 6), "");
        assert_eq!(clamped_substring("二〇二三年", 0, 2), "二〇");
    }

    #[test]
    fn debug_lines_need_verbosity() {
        assert!(!Console::new(0).enabled(Level::Debug));
        assert!(Console::new(1).enabled(Level::Debug));
        assert!(Console::new(0).enabled(Level::Warn));
    }
}
