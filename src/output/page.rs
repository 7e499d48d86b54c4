use std::collections::HashMap;

use itertools::Itertools;

use super::{FilingReport, ANNOUNCEMENT_SECTION_ID};
use crate::disclosure::{
    router::{Anchor, SectionRow},
    Placement, Section, Slot, Tile, SLOT_VERSIONS,
};
use crate::status::{StatusLabel, LINE_BREAK_MARKER};

const PAGE_CSS: &str = r#"
body { font-family: "PingFang SC", "Microsoft YaHei", sans-serif; margin: 2rem; color: #1e293b; }
h1 { font-size: 1.5rem; margin-bottom: .25rem; }
.status { font-weight: 700; color: #135bec; }
table { border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; }
th, td { border: 1px solid #e2e8f0; padding: .4rem .6rem; text-align: left; vertical-align: top; }
td a { display: inline-block; margin-right: .5rem; }
.hidden { display: none; }
"#;

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn status_markup(label: &StatusLabel) -> String {
    match label.secondary {
        Some(secondary) => format!(
            "{}{}{}",
            escape_html(label.primary),
            LINE_BREAK_MARKER,
            escape_html(secondary)
        ),
        None => escape_html(label.primary),
    }
}

fn anchor_html(anchor: &Anchor) -> String {
    format!(
        r#"<a href="{}" title="{}" target="_blank">{}</a>"#,
        escape_html(&anchor.href),
        escape_html(&anchor.title),
        escape_html(&anchor.date)
    )
}

fn row_html(section: Section, row: &SectionRow) -> String {
    let mut out = String::new();
    out.push_str("<tr>");
    out.push_str(&format!("<td>{}</td>", row.index));
    out.push_str(&format!(
        r#"<td><a href="{}" target="_blank">{}</a></td>"#,
        escape_html(&row.href),
        escape_html(&row.title)
    ));
    if section == Section::InquiryReply {
        out.push_str(&format!(
            "<td>{}</td>",
            row.party.map(|p| p.label()).unwrap_or("-")
        ));
    }
    out.push_str(&format!("<td>{}</td>", escape_html(&row.date)));
    out.push_str("</tr>\n");
    out
}

fn render_tiles(slots: &HashMap<&Slot, Vec<&Anchor>>) -> String {
    let mut out = String::new();
    out.push_str(r#"<section id="xxpl"><h2>信息披露</h2><table><thead><tr><th>文件</th>"#);
    for (_, name) in SLOT_VERSIONS.iter() {
        out.push_str(&format!("<th>{}</th>", name));
    }
    out.push_str("</tr></thead><tbody>\n");
    for tile in Tile::ALL {
        out.push_str(&format!(
            r#"<tr id="{}"><th>{}</th>"#,
            tile.element_id(),
            tile.title()
        ));
        for (version, _) in SLOT_VERSIONS.iter() {
            let slot = Slot::new(tile, version);
            let cell = slots
                .get(&slot)
                .map(|anchors| anchors.iter().map(|a| anchor_html(a)).join(""))
                .unwrap_or_default();
            out.push_str(&format!(
                r#"<td class="{}">{}</td>"#,
                slot.cell_class(),
                cell
            ));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody></table></section>\n");
    out
}

fn render_section(report: &FilingReport, section: Section) -> String {
    let hidden = section == Section::ReviewTermination && !report.view.reveal_termination;
    let class = match section {
        Section::ReviewTermination if hidden => r#" class="zzhtz hidden""#,
        Section::ReviewTermination => r#" class="zzhtz""#,
        _ => "",
    };
    let mut out = String::new();
    out.push_str(&format!(
        r#"<section{}><h2>{}</h2><table id="{}"><thead><tr><th>序号</th><th>文件</th>"#,
        class,
        section.title(),
        section.element_id()
    ));
    if section == Section::InquiryReply {
        out.push_str("<th>回复方</th>");
    }
    out.push_str("<th>日期</th></tr></thead><tbody>\n");
    for row in report.view.rows(section) {
        out.push_str(&row_html(section, row));
    }
    out.push_str("</tbody></table></section>\n");
    out
}

fn render_announcements(report: &FilingReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        r#"<section><h2>上市委会议公告与结果</h2><table id="{}"><thead><tr><th>序号</th><th>文件</th><th>日期</th></tr></thead><tbody>"#,
        ANNOUNCEMENT_SECTION_ID
    ));
    out.push('\n');
    for a in report.announcements.iter() {
        out.push_str(&format!(
            r#"<tr><td>{}</td><td><a href="{}" target="_blank">{}</a></td><td>{}</td></tr>"#,
            a.index,
            escape_html(&a.href),
            escape_html(&a.title),
            escape_html(&a.date)
        ));
        out.push('\n');
    }
    out.push_str("</tbody></table></section>\n");
    out
}

fn render_header(report: &FilingReport) -> String {
    let company = report.company.as_deref().unwrap_or("-");
    let mut out = String::new();
    out.push_str(&format!("<header><h1>{}</h1>", escape_html(company)));
    out.push_str(&format!(
        r#"<p class="status" id="status">{}</p>"#,
        status_markup(&report.status)
    ));
    let facts = [
        ("审核编号", report.audit_number.as_deref()),
        ("受理日期", report.apply_date.as_deref()),
        ("更新日期", report.update_date.as_deref()),
    ];
    let facts = facts
        .iter()
        .filter_map(|(k, v)| v.map(|v| format!("<dt>{}</dt><dd>{}</dd>", k, escape_html(v))))
        .join("");
    if !facts.is_empty() {
        out.push_str(&format!("<dl>{}</dl>", facts));
    }
    out.push_str("</header>\n");
    out
}

/// Slot versions without a cell (for example `vs4`) are left out of the page.
pub fn render_page(report: &FilingReport) -> String {
    let slots: HashMap<&Slot, Vec<&Anchor>> = report
        .view
        .placements
        .iter()
        .filter_map(|p| match p {
            Placement::VersionedAnchor { slot, anchor } => Some((slot, anchor)),
            _ => None,
        })
        .into_group_map();

    let title = report.company.as_deref().unwrap_or(report.source.as_str());
    let mut body = String::new();
    body.push_str(&render_header(report));
    body.push_str(&render_tiles(&slots));
    for section in Section::ALL {
        body.push_str(&render_section(report, section));
    }
    body.push_str(&render_announcements(report));

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="utf-8"/>
  <title>{title} - 信息披露</title>
  <style>{css}</style>
</head>
<body>
{body}</body>
</html>
"#,
        title = escape_html(title),
        css = PAGE_CSS,
        body = body,
    )
}
