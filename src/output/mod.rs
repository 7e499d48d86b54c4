pub mod page;

use serde::Serialize;

use crate::disclosure::{DisclosureView, DocumentRouter, Placement};
use crate::payload::{AnnouncementRecord, CompanyOverview, FilingPayload};
use crate::status::{FilingStatus, StatusLabel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Table id of the meeting announcements section.
pub const ANNOUNCEMENT_SECTION_ID: &str = "sswhgg";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnnouncementRow {
    pub index: u32,
    pub kind: Option<String>,
    pub date: String,
    pub href: String,
    pub title: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FilingReport {
    pub source: String,
    pub company: Option<String>,
    pub audit_number: Option<String>,
    pub apply_date: Option<String>,
    pub update_date: Option<String>,
    pub codes: FilingStatus,
    pub status: StatusLabel,
    pub view: DisclosureView,
    pub announcements: Vec<AnnouncementRow>,
}

/// Label the filing and route its records with a fresh router.
///
/// Codes present in `overview` take precedence over the payload's own.
pub fn build_report(
    source: &str,
    payload: &FilingPayload,
    overview: Option<&CompanyOverview>,
    announcements: &[AnnouncementRecord],
    static_base: &str,
) -> FilingReport {
    let mut codes = payload.status.clone();
    if let Some(overview) = overview {
        codes.merge(&overview.status);
    }
    let mut router = DocumentRouter::new(static_base);
    let view = router.route(payload.records());
    let rows = announcements
        .iter()
        .enumerate()
        .map(|(i, a)| AnnouncementRow {
            index: i as u32 + 1,
            kind: a.file_type.clone(),
            date: a.date(),
            href: a.href(static_base),
            title: a.title().to_string(),
        })
        .collect();
    FilingReport {
        source: source.to_string(),
        company: overview
            .and_then(|o| o.name.clone())
            .or_else(|| payload.company())
            .or_else(|| announcements.iter().find_map(|a| a.company().map(str::to_string))),
        audit_number: overview.and_then(|o| o.audit_number.clone()),
        apply_date: overview.and_then(|o| o.apply_date.clone()),
        update_date: overview.and_then(|o| o.update_date.clone()),
        status: codes.label(),
        codes,
        view,
        announcements: rows,
    }
}

pub fn render_text(reports: &[FilingReport]) -> Vec<u8> {
    let mut out = String::new();
    for r in reports {
        out.push_str(&format!("== {} ==\n", r.source));
        if let Some(company) = r.company.as_deref() {
            out.push_str(&format!("company: {}\n", company));
        }
        out.push_str(&format!("status: {}\n", r.status));
        for p in r.view.placements.iter() {
            match p {
                Placement::VersionedAnchor { slot, anchor } => {
                    out.push_str(&format!(
                        "{}\t{}\t{}\t{}\n",
                        slot, anchor.date, anchor.title, anchor.href
                    ));
                }
                Placement::SectionRow { section, row } => {
                    out.push_str(&format!(
                        "{}\t#{}\t{}\t{}\t{}\n",
                        section, row.index, row.date, row.title, row.href
                    ));
                }
            }
        }
        for a in r.announcements.iter() {
            out.push_str(&format!(
                "#{} tbody\t#{}\t{}\t{}\t{}\n",
                ANNOUNCEMENT_SECTION_ID, a.index, a.date, a.title, a.href
            ));
        }
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(reports: &[FilingReport]) -> Vec<u8> {
    serde_json::to_vec_pretty(reports).unwrap_or_else(|_| b"[]\n".to_vec())
}

pub fn render_html(report: &FilingReport) -> Vec<u8> {
    page::render_page(report).into_bytes()
}
