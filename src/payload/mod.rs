use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::disclosure::{self, FileRecord};
use crate::status::FilingStatus;
use crate::utils;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid payload JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("overview payload has no company entry")]
    EmptyOverview,
}

fn jsonp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^\s*[A-Za-z_$][\w$.]*\s*\((.*)\)\s*;?\s*$").expect("static regex")
    })
}

/// Strip a `callback( ... )` wrapper if the body has one.
pub fn unwrap_jsonp(body: &str) -> &str {
    match jsonp_pattern().captures(body).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => body.trim(),
    }
}

/// Disclosure listing for one filing, with the status codes alongside.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingPayload {
    #[serde(default)]
    pub result: Option<Vec<FileRecord>>,
    #[serde(flatten)]
    pub status: FilingStatus,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub stock_audit_name: Option<String>,
}

impl FilingPayload {
    pub fn records(&self) -> Option<&[FileRecord]> {
        self.result.as_deref()
    }

    /// Company name from the payload itself, else from the first record.
    pub fn company(&self) -> Option<String> {
        self.stock_audit_name.clone().or_else(|| {
            self.result
                .as_ref()
                .and_then(|records| records.iter().find_map(|r| r.company_full_name.clone()))
        })
    }
}

pub fn parse_filing(body: &str) -> Result<FilingPayload, PayloadError> {
    serde_json::from_str(unwrap_jsonp(body)).map_err(|e| PayloadError::InvalidJson { source: e })
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewEntry {
    #[serde(flatten)]
    status: FilingStatus,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    stock_audit_name: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    stock_audit_num: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    audit_apply_date: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    update_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverviewEnvelope {
    #[serde(default)]
    result: Vec<OverviewEntry>,
}

/// Company summary from the project-list query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompanyOverview {
    pub name: Option<String>,
    pub audit_number: Option<String>,
    pub status: FilingStatus,
    pub apply_date: Option<String>,
    pub update_date: Option<String>,
}

pub fn parse_overview(body: &str) -> Result<CompanyOverview, PayloadError> {
    let envelope: OverviewEnvelope = serde_json::from_str(unwrap_jsonp(body))
        .map_err(|e| PayloadError::InvalidJson { source: e })?;
    let entry = envelope
        .result
        .into_iter()
        .next()
        .ok_or(PayloadError::EmptyOverview)?;
    Ok(CompanyOverview {
        name: entry.stock_audit_name,
        audit_number: entry.stock_audit_num,
        status: entry.status,
        apply_date: entry
            .audit_apply_date
            .as_deref()
            .map(disclosure::format_update_date),
        update_date: entry
            .update_date
            .as_deref()
            .map(disclosure::format_update_date),
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAuditRef {
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub company_full_name: Option<String>,
}

/// A listing-committee meeting announcement or result notice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRecord {
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_type: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_title: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_update_time: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub stock_audit: Option<Vec<StockAuditRef>>,
}

impl AnnouncementRecord {
    pub fn title(&self) -> &str {
        self.file_title.as_deref().unwrap_or_default()
    }

    pub fn company(&self) -> Option<&str> {
        self.stock_audit
            .as_deref()
            .and_then(|audits| audits.first())
            .and_then(|a| a.company_full_name.as_deref())
    }

    /// `publishDate` when the backend sends one, else the sliced update time.
    pub fn date(&self) -> String {
        match self.publish_date.as_deref() {
            Some(date) if !date.trim().is_empty() => date.trim().to_string(),
            _ => disclosure::format_update_date(self.file_update_time.as_deref().unwrap_or_default()),
        }
    }

    pub fn href(&self, static_base: &str) -> String {
        format!(
            "{}{}",
            static_base,
            self.file_path.as_deref().unwrap_or_default()
        )
    }
}

#[derive(Debug, Deserialize)]
struct AnnouncementEnvelope {
    #[serde(default)]
    result: Option<Vec<AnnouncementRecord>>,
}

/// Decode the meeting announcements query. A missing or null `result` is an
/// empty list.
pub fn parse_announcements(body: &str) -> Result<Vec<AnnouncementRecord>, PayloadError> {
    let envelope: AnnouncementEnvelope = serde_json::from_str(unwrap_jsonp(body))
        .map_err(|e| PayloadError::InvalidJson { source: e })?;
    Ok(envelope.result.unwrap_or_default())
}
