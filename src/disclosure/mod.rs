pub mod router;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils;

pub use router::{DisclosureView, DocumentRouter, Placement, SectionCounters};

pub const DEFAULT_STATIC_BASE: &str = "http://static.sse.com.cn/stock";

// A disclosure document as listed by the backend. Every field is optional;
// missing text renders as an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_type: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_version: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_update_time: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_title: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub company_full_name: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub publish_date: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    pub file_id: Option<String>,
}

impl FileRecord {
    pub fn new(file_type: &str, file_version: &str, file_update_time: &str) -> Self {
        Self {
            file_type: Some(file_type.to_string()),
            file_version: Some(file_version.to_string()),
            file_update_time: Some(file_update_time.to_string()),
            ..Self::default()
        }
    }

    pub fn with_link(mut self, file_path: &str, file_title: &str) -> Self {
        self.file_path = Some(file_path.to_string());
        self.file_title = Some(file_title.to_string());
        self
    }

    pub fn title(&self) -> &str {
        self.file_title.as_deref().unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.file_version.as_deref().unwrap_or_default()
    }

    pub fn update_date(&self) -> String {
        format_update_date(self.file_update_time.as_deref().unwrap_or_default())
    }

    pub fn href(&self, static_base: &str) -> String {
        format!(
            "{}{}",
            static_base,
            self.file_path.as_deref().unwrap_or_default()
        )
    }
}

/// `YYYYMMDD...` to `YYYY-MM-DD` by fixed offsets. Nothing is validated.
pub fn format_update_date(raw: &str) -> String {
    format!(
        "{}-{}-{}",
        utils::clamped_substring(raw, 0, 4),
        utils::clamped_substring(raw, 4, 6),
        utils::clamped_substring(raw, 6, 8)
    )
}

/// Cell group for documents that have one reference per draft version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Tile {
    Prospectus,
    IssuanceSponsorLetter,
    ListingSponsorLetter,
    AuditReport,
    LegalOpinion,
    Other,
}

impl Tile {
    pub const ALL: [Tile; 6] = [
        Tile::Prospectus,
        Tile::IssuanceSponsorLetter,
        Tile::ListingSponsorLetter,
        Tile::AuditReport,
        Tile::LegalOpinion,
        Tile::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Tile::Prospectus => "30",
            Tile::IssuanceSponsorLetter => "36",
            Tile::ListingSponsorLetter => "37",
            Tile::AuditReport => "32",
            Tile::LegalOpinion => "33",
            Tile::Other => "34",
        }
    }

    pub fn element_id(self) -> String {
        format!("tile{}", self.code())
    }

    pub fn title(self) -> &'static str {
        match self {
            Tile::Prospectus => "招股说明书",
            Tile::IssuanceSponsorLetter => "发行保荐书",
            Tile::ListingSponsorLetter => "上市保荐书",
            Tile::AuditReport => "审计报告",
            Tile::LegalOpinion => "法律意见书",
            Tile::Other => "其他",
        }
    }
}

/// Draft versions that have a cell in every tile.
pub const SLOT_VERSIONS: [(&str, &str); 3] = [("1", "申报稿"), ("2", "上会稿"), ("3", "注册稿")];

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Slot {
    pub tile: Tile,
    pub version: String,
}

impl Slot {
    pub fn new(tile: Tile, version: &str) -> Self {
        Self {
            tile,
            version: version.to_string(),
        }
    }

    pub fn cell_class(&self) -> String {
        format!("vs{}", self.version)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} .{}", self.tile.element_id(), self.cell_class())
    }
}

/// Append-only notice tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Section {
    InquiryReply,
    RegistrationResult,
    ReviewTermination,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::InquiryReply,
        Section::RegistrationResult,
        Section::ReviewTermination,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Section::InquiryReply => "yjhf",
            Section::RegistrationResult => "zcjgtzc",
            Section::ReviewTermination => "zzhtz",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::InquiryReply => "问询与回复",
            Section::RegistrationResult => "注册结果通知",
            Section::ReviewTermination => "终止审核通知",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} tbody", self.element_id())
    }
}

/// Who answered an inquiry, read off the numbering of the reply title.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ReplyParty {
    IssuerAndSponsor,
    Accountant,
    Lawyer,
}

impl ReplyParty {
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.trim_start();
        if title.starts_with("8-1") {
            Some(Self::IssuerAndSponsor)
        } else if title.starts_with("8-2") {
            Some(Self::Accountant)
        } else if title.starts_with("8-3") {
            Some(Self::Lawyer)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::IssuerAndSponsor => "发行人及保荐机构",
            Self::Accountant => "会计师",
            Self::Lawyer => "律师",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Versioned(Slot),
    Section(Section),
}

pub fn classify(record: &FileRecord) -> Route {
    let version = record.version();
    match record.file_type.as_deref() {
        Some("30") => Route::Versioned(Slot::new(Tile::Prospectus, version)),
        Some("36") => Route::Versioned(Slot::new(Tile::IssuanceSponsorLetter, version)),
        Some("37") => Route::Versioned(Slot::new(Tile::ListingSponsorLetter, version)),
        Some("32") => Route::Versioned(Slot::new(Tile::AuditReport, version)),
        Some("33") => Route::Versioned(Slot::new(Tile::LegalOpinion, version)),
        Some("5") | Some("6") => Route::Section(Section::InquiryReply),
        Some("35") => Route::Section(Section::RegistrationResult),
        Some("38") => Route::Section(Section::ReviewTermination),
        _ => Route::Versioned(Slot::new(Tile::Other, version)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_date_is_sliced() {
        assert_eq!(format_update_date("20230115"), "2023-01-15");
        assert_eq!(format_update_date("20211231173000"), "2021-12-31");
    }

    #[test]
    fn malformed_update_date_is_not_validated() {
        assert_eq!(format_update_date("202301"), "2023-01-");
        assert_eq!(format_update_date(""), "--");
        assert_eq!(format_update_date("2023-1-5"), "2023--1--5");
    }

    #[test]
    fn classify_versioned_types() {
        let record = FileRecord::new("36", "2", "20230115");
        assert_eq!(
            classify(&record),
            Route::Versioned(Slot::new(Tile::IssuanceSponsorLetter, "2"))
        );
    }

    #[test]
    fn classify_unrecognized_type_falls_back_to_other_tile() {
        let record = FileRecord::new("99", "3", "20230115");
        assert_eq!(
            classify(&record),
            Route::Versioned(Slot::new(Tile::Other, "3"))
        );
        let missing = FileRecord::default();
        assert_eq!(classify(&missing), Route::Versioned(Slot::new(Tile::Other, "")));
    }

    #[test]
    fn classify_sections() {
        assert_eq!(
            classify(&FileRecord::new("5", "1", "")),
            Route::Section(Section::InquiryReply)
        );
        assert_eq!(
            classify(&FileRecord::new("35", "4", "")),
            Route::Section(Section::RegistrationResult)
        );
        assert_eq!(
            classify(&FileRecord::new("38", "4", "")),
            Route::Section(Section::ReviewTermination)
        );
    }

    #[test]
    fn reply_party_from_title_prefix() {
        assert_eq!(
            ReplyParty::from_title("8-1-2 发行人及保荐机构关于第二轮审核问询函的回复"),
            Some(ReplyParty::IssuerAndSponsor)
        );
        assert_eq!(
            ReplyParty::from_title("8-2-2 申报会计师关于问询函回复的专项说明"),
            Some(ReplyParty::Accountant)
        );
        assert_eq!(
            ReplyParty::from_title("8-3 补充法律意见书（二）"),
            Some(ReplyParty::Lawyer)
        );
        assert_eq!(ReplyParty::from_title("审核问询函"), None);
    }

    #[test]
    fn record_decodes_numeric_codes() {
        let record: FileRecord = serde_json::from_str(
            r#"{"fileUpdateTime":"20211230170001","filePath":"/information/c/a.pdf","fileTitle":"8-3 补充法律意见书（二）","fileVersion":1,"fileType":6,"fileSize":881602}"#,
        )
        .unwrap();
        assert_eq!(record.file_type.as_deref(), Some("6"));
        assert_eq!(record.version(), "1");
        assert_eq!(record.update_date(), "2021-12-30");
        assert_eq!(
            record.href(DEFAULT_STATIC_BASE),
            "http://static.sse.com.cn/stock/information/c/a.pdf"
        );
    }

    #[test]
    fn slot_and_section_targets() {
        assert_eq!(Slot::new(Tile::AuditReport, "1").to_string(), "#tile32 .vs1");
        assert_eq!(Section::ReviewTermination.to_string(), "#zzhtz tbody");
    }
}
