use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils;

/// Review-stage codes of a filing, as delivered by the backend.
///
/// Every field is an opaque token. `None` and any unrecognized value take the
/// same fallback arm.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", from = "RawFilingStatus")]
pub struct FilingStatus {
    pub status: Option<String>,
    pub sub_status: Option<String>,
    #[serde(rename = "registeResult")]
    pub register_result: Option<String>,
    pub suspend_status: Option<String>,
}

// The backend spells some codes two ways depending on the query. Both
// spellings may appear in one body; the first-named key wins.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilingStatus {
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    status: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    curr_status: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    sub_status: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    commiti_result: Option<String>,
    #[serde(default, rename = "registeResult", deserialize_with = "utils::de_opt_code")]
    registe_result: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    register_result: Option<String>,
    #[serde(default, deserialize_with = "utils::de_opt_code")]
    suspend_status: Option<String>,
}

impl From<RawFilingStatus> for FilingStatus {
    fn from(raw: RawFilingStatus) -> Self {
        Self {
            status: raw.status.or(raw.curr_status),
            sub_status: raw.sub_status.or(raw.commiti_result),
            register_result: raw.registe_result.or(raw.register_result),
            suspend_status: raw.suspend_status,
        }
    }
}

impl FilingStatus {
    pub fn new(
        status: Option<&str>,
        sub_status: Option<&str>,
        register_result: Option<&str>,
        suspend_status: Option<&str>,
    ) -> Self {
        Self {
            status: status.map(str::to_string),
            sub_status: sub_status.map(str::to_string),
            register_result: register_result.map(str::to_string),
            suspend_status: suspend_status.map(str::to_string),
        }
    }

    pub fn classify(&self) -> Status {
        Status::classify(
            self.status.as_deref(),
            self.sub_status.as_deref(),
            self.register_result.as_deref(),
            self.suspend_status.as_deref(),
        )
    }

    pub fn label(&self) -> StatusLabel {
        self.classify().label()
    }

    /// Overlay the codes present in `other` on top of these.
    pub fn merge(&mut self, other: &FilingStatus) {
        if other.status.is_some() {
            self.status = other.status.clone();
        }
        if other.sub_status.is_some() {
            self.sub_status = other.sub_status.clone();
        }
        if other.register_result.is_some() {
            self.register_result = other.register_result.clone();
        }
        if other.suspend_status.is_some() {
            self.suspend_status = other.suspend_status.clone();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitteeOutcome {
    Passed,
    ConditionallyPassed,
    Rejected,
    Deferred,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Effective,
    Denied,
    Terminated,
    Pending,
}

/// Unlike the other outcomes there is no "unknown" case here: a missing or
/// unrecognized suspend code means suspension together with a financial
/// update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuspendReason {
    FinancialUpdate,
    OtherMatters,
    FinancialUpdateAndOther,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReReviewOutcome {
    Passed,
    Rejected,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Accepted,
    Inquired,
    Committee(CommitteeOutcome),
    SubmittedForRegistration,
    Registration(RegistrationOutcome),
    Issued,
    Suspended(SuspendReason),
    Terminated,
    ReReview(ReReviewOutcome),
    SupplementaryReview,
    Unknown,
}

impl Status {
    pub fn classify(
        status: Option<&str>,
        sub_status: Option<&str>,
        register_result: Option<&str>,
        suspend_status: Option<&str>,
    ) -> Self {
        match status {
            Some("1") => Self::Accepted,
            Some("2") => Self::Inquired,
            Some("3") => Self::Committee(match sub_status {
                Some("1") => CommitteeOutcome::Passed,
                Some("2") => CommitteeOutcome::ConditionallyPassed,
                Some("3") => CommitteeOutcome::Rejected,
                Some("6") => CommitteeOutcome::Deferred,
                _ => CommitteeOutcome::Pending,
            }),
            Some("4") => Self::SubmittedForRegistration,
            Some("5") => Self::Registration(match register_result {
                Some("1") => RegistrationOutcome::Effective,
                Some("2") => RegistrationOutcome::Denied,
                Some("3") => RegistrationOutcome::Terminated,
                _ => RegistrationOutcome::Pending,
            }),
            Some("6") => Self::Issued,
            Some("7") => Self::Suspended(match suspend_status {
                Some("1") => SuspendReason::FinancialUpdate,
                Some("2") => SuspendReason::OtherMatters,
                _ => SuspendReason::FinancialUpdateAndOther,
            }),
            Some("8") => Self::Terminated,
            Some("9") => Self::ReReview(match sub_status {
                Some("4") => ReReviewOutcome::Passed,
                Some("5") => ReReviewOutcome::Rejected,
                _ => ReReviewOutcome::Pending,
            }),
            Some("10") => Self::SupplementaryReview,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> StatusLabel {
        match self {
            Self::Accepted => StatusLabel::single("已受理"),
            Self::Inquired => StatusLabel::single("已问询"),
            Self::Committee(outcome) => match outcome {
                CommitteeOutcome::Passed => StatusLabel::double("上市委会议", "通过"),
                CommitteeOutcome::ConditionallyPassed => StatusLabel::single("有条件通过"),
                CommitteeOutcome::Rejected => StatusLabel::double("上市委会议", "未通过"),
                CommitteeOutcome::Deferred => StatusLabel::single("暂缓审议"),
                CommitteeOutcome::Pending => StatusLabel::single("上市委会议"),
            },
            Self::SubmittedForRegistration => StatusLabel::single("提交注册"),
            Self::Registration(outcome) => match outcome {
                RegistrationOutcome::Effective => StatusLabel::single("注册生效"),
                RegistrationOutcome::Denied => StatusLabel::single("不予注册"),
                RegistrationOutcome::Terminated => StatusLabel::single("终止注册"),
                RegistrationOutcome::Pending => StatusLabel::single("注册结果"),
            },
            Self::Issued => StatusLabel::single("已发行"),
            Self::Suspended(reason) => match reason {
                SuspendReason::FinancialUpdate => StatusLabel::double("中止", "（财报更新）"),
                SuspendReason::OtherMatters => StatusLabel::double("中止", "（其他事项）"),
                SuspendReason::FinancialUpdateAndOther => StatusLabel::single("中止及财报更新"),
            },
            Self::Terminated => StatusLabel::single("终止"),
            Self::ReReview(outcome) => match outcome {
                ReReviewOutcome::Passed => StatusLabel::double("复审委会议", "通过"),
                ReReviewOutcome::Rejected => StatusLabel::double("复审委会议", "未通过"),
                ReReviewOutcome::Pending => StatusLabel::single("复审委会议"),
            },
            Self::SupplementaryReview => StatusLabel::single("补充审核"),
            Self::Unknown => StatusLabel::single("-"),
        }
    }
}

/// Marker placed between the two lines of a label in markup form.
pub const LINE_BREAK_MARKER: &str = "<br>";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusLabel {
    pub primary: &'static str,
    pub secondary: Option<&'static str>,
}

impl StatusLabel {
    const fn single(primary: &'static str) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    const fn double(primary: &'static str, secondary: &'static str) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    pub fn markup(&self) -> String {
        match self.secondary {
            Some(secondary) => format!("{}{}{}", self.primary, LINE_BREAK_MARKER, secondary),
            None => self.primary.to_string(),
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primary)?;
        if let Some(secondary) = self.secondary {
            f.write_str(secondary)?;
        }
        Ok(())
    }
}

pub fn status_label(
    status: Option<&str>,
    sub_status: Option<&str>,
    register_result: Option<&str>,
    suspend_status: Option<&str>,
) -> StatusLabel {
    Status::classify(status, sub_status, register_result, suspend_status).label()
}
