use serde::Serialize;

use super::{classify, FileRecord, ReplyParty, Route, Section, Slot, DEFAULT_STATIC_BASE};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub date: String,
    pub href: String,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionRow {
    pub index: u32,
    pub date: String,
    pub href: String,
    pub title: String,
    pub party: Option<ReplyParty>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Placement {
    VersionedAnchor { slot: Slot, anchor: Anchor },
    SectionRow { section: Section, row: SectionRow },
}

/// Row numbering for the notice tables.
///
/// Registration-result and review-termination rows draw from the same
/// `notice` counter, so their numbers interleave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SectionCounters {
    pub reply: u32,
    pub notice: u32,
}

impl SectionCounters {
    fn next(&mut self, section: Section) -> u32 {
        let counter = match section {
            Section::InquiryReply => &mut self.reply,
            Section::RegistrationResult | Section::ReviewTermination => &mut self.notice,
        };
        *counter += 1;
        *counter
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DisclosureView {
    pub placements: Vec<Placement>,
    pub reveal_termination: bool,
}

impl DisclosureView {
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty() && !self.reveal_termination
    }

    pub fn anchors<'a>(&'a self, slot: &'a Slot) -> impl Iterator<Item = &'a Anchor> + 'a {
        self.placements.iter().filter_map(move |p| match p {
            Placement::VersionedAnchor { slot: s, anchor } if s == slot => Some(anchor),
            _ => None,
        })
    }

    pub fn rows(&self, section: Section) -> impl Iterator<Item = &SectionRow> + '_ {
        self.placements.iter().filter_map(move |p| match p {
            Placement::SectionRow { section: s, row } if *s == section => Some(row),
            _ => None,
        })
    }
}

/// Routes file records into slots and section rows.
///
/// Counters live as long as the router: routing twice on one router keeps
/// numbering rows where the previous call stopped.
#[derive(Clone, Debug)]
pub struct DocumentRouter {
    static_base: String,
    counters: SectionCounters,
}

impl Default for DocumentRouter {
    fn default() -> Self {
        Self::new(DEFAULT_STATIC_BASE)
    }
}

impl DocumentRouter {
    pub fn new(static_base: &str) -> Self {
        Self {
            static_base: static_base.to_string(),
            counters: SectionCounters::default(),
        }
    }

    pub fn with_counters(mut self, counters: SectionCounters) -> Self {
        self.counters = counters;
        self
    }

    pub fn counters(&self) -> SectionCounters {
        self.counters
    }

    pub fn route(&mut self, records: Option<&[FileRecord]>) -> DisclosureView {
        let mut view = DisclosureView::default();
        for record in records.unwrap_or_default() {
            let date = record.update_date();
            let href = record.href(&self.static_base);
            let title = record.title().to_string();
            match classify(record) {
                Route::Versioned(slot) => view.placements.push(Placement::VersionedAnchor {
                    slot,
                    anchor: Anchor { date, href, title },
                }),
                Route::Section(section) => {
                    let party = match section {
                        Section::InquiryReply => ReplyParty::from_title(&title),
                        _ => None,
                    };
                    let row = SectionRow {
                        index: self.counters.next(section),
                        date,
                        href,
                        title,
                        party,
                    };
                    if section == Section::ReviewTermination {
                        view.reveal_termination = true;
                    }
                    view.placements.push(Placement::SectionRow { section, row });
                }
            }
        }
        view
    }

    pub fn route_records(&mut self, records: &[FileRecord]) -> DisclosureView {
        self.route(Some(records))
    }
}
