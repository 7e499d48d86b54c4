use std::path::{Path, PathBuf};

use crate::disclosure::{DocumentRouter, FileRecord, Section, Slot, Tile};
use crate::output::{self, OutputFormat};
use crate::payload;
use crate::runner::{Options, Runner};
use crate::status::status_label;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kcbtrack-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path.to_string_lossy().to_string()
}

const FILING: &str = r#"jsonpCallback99417({"result":[
    {"fileType":30,"fileVersion":1,"fileUpdateTime":"20210616","filePath":"/information/c/202106/a.pdf","fileTitle":"招股说明书（申报稿）","companyFullName":"北京英诺特生物技术股份有限公司"},
    {"fileType":30,"fileVersion":2,"fileUpdateTime":"20211020","filePath":"/information/c/202110/b.pdf","fileTitle":"招股说明书（上会稿）"},
    {"fileType":5,"fileVersion":1,"fileUpdateTime":"20210715","filePath":"/information/c/202107/c.pdf","fileTitle":"8-1 发行人及保荐机构回复意见"},
    {"fileType":6,"fileVersion":1,"fileUpdateTime":"20210715","filePath":"/information/c/202107/d.pdf","fileTitle":"8-3 补充法律意见书"},
    {"fileType":35,"fileVersion":4,"fileUpdateTime":"20211230","filePath":"/information/c/202112/e.pdf","fileTitle":"同意注册的批复"},
    {"fileType":99,"fileVersion":3,"fileUpdateTime":"20211230","filePath":"/information/c/202112/f.pdf","fileTitle":"其他文件"}
],"status":"5","registeResult":1,"suspendStatus":""});"#;

#[test]
fn labeler_is_total() {
    let codes = [None, Some(""), Some("1"), Some("2"), Some("3"), Some("6"), Some("99")];
    for status in codes {
        for sub in codes {
            for reg in codes {
                let label = status_label(status, sub, reg, None);
                assert!(!label.primary.is_empty());
            }
        }
    }
    assert_eq!(status_label(None, None, None, None).to_string(), "-");
}

#[test]
fn labeler_decision_table() {
    assert_eq!(status_label(Some("3"), Some("2"), None, None).to_string(), "有条件通过");
    assert_eq!(status_label(Some("5"), None, Some("1"), None).to_string(), "注册生效");
    assert_eq!(status_label(Some("7"), None, None, None).to_string(), "中止及财报更新");
    assert_eq!(
        status_label(Some("9"), Some("4"), None, None).markup(),
        "复审委会议<br>通过"
    );
    assert_eq!(status_label(Some("9"), Some("9"), None, None).to_string(), "复审委会议");
    assert_eq!(status_label(Some("99"), None, None, None).to_string(), "-");
}

#[test]
fn router_counts_rows_across_calls() {
    let mut router = DocumentRouter::new("http://static.example");
    let reply = FileRecord::new("6", "1", "20230115").with_link("/r.pdf", "回复");
    let first = router.route_records(std::slice::from_ref(&reply));
    let second = router.route_records(std::slice::from_ref(&reply));
    assert_eq!(first.rows(Section::InquiryReply).next().map(|r| r.index), Some(1));
    assert_eq!(second.rows(Section::InquiryReply).next().map(|r| r.index), Some(2));
    assert!(first
        .placements
        .iter()
        .all(|p| matches!(p, crate::disclosure::Placement::SectionRow { .. })));

    let mut fresh = DocumentRouter::new("http://static.example");
    let view = fresh.route_records(std::slice::from_ref(&reply));
    assert_eq!(view.rows(Section::InquiryReply).next().map(|r| r.index), Some(1));
}

#[test]
fn router_absent_result_is_empty() {
    let mut router = DocumentRouter::default();
    assert!(router.route(None).is_empty());
    assert_eq!(router.counters().reply, 0);
}

#[test]
fn full_payload_end_to_end() {
    let filing = payload::parse_filing(FILING).unwrap();
    let report = output::build_report("942.json", &filing, None, &[], "http://static.sse.com.cn/stock");

    assert_eq!(report.status.to_string(), "注册生效");
    assert_eq!(report.company.as_deref(), Some("北京英诺特生物技术股份有限公司"));

    let v1 = Slot::new(Tile::Prospectus, "1");
    let anchors: Vec<_> = report.view.anchors(&v1).collect();
    assert_eq!(anchors.len(), 1);
    assert_eq!(anchors[0].date, "2021-06-16");
    assert_eq!(
        anchors[0].href,
        "http://static.sse.com.cn/stock/information/c/202106/a.pdf"
    );

    let replies: Vec<_> = report.view.rows(Section::InquiryReply).collect();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].index, 1);
    assert_eq!(replies[1].index, 2);
    assert_eq!(replies[1].party.map(|p| p.label()), Some("律师"));

    let notices: Vec<_> = report.view.rows(Section::RegistrationResult).collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].index, 1);
    assert!(!report.view.reveal_termination);

    let other = Slot::new(Tile::Other, "3");
    assert_eq!(report.view.anchors(&other).count(), 1);

    let html = String::from_utf8(output::render_html(&report)).unwrap();
    assert!(html.contains("/information/c/202112/f.pdf"));
    assert!(html.contains(r#"class="zzhtz hidden""#));
}

#[tokio::test]
async fn runner_processes_directory_in_order() {
    let dir = scratch_dir("dir-order");
    write(&dir, "b.json", r#"{"status":"2"}"#);
    write(&dir, "a.jsonp", FILING);
    write(&dir, "a.overview.jsonp", r#"cb({"result":[{"stockAuditName":"示例公司","stockAuditNum":"942","currStatus":8,"auditApplyDate":"20210616165743","updateDate":"20211230191852"}]})"#);
    write(&dir, "notes.md", "ignored");

    let runner = Runner::new(Options {
        input_dir: Some(dir.to_string_lossy().to_string()),
        ..Options::default()
    })
    .unwrap();
    let batch = runner.run().await.unwrap();

    assert!(batch.failures.is_empty());
    assert_eq!(batch.reports.len(), 2);
    assert!(batch.reports[0].source.ends_with("a.jsonp"));
    assert_eq!(batch.reports[0].company.as_deref(), Some("示例公司"));
    assert_eq!(batch.reports[0].audit_number.as_deref(), Some("942"));
    assert_eq!(batch.reports[0].status.to_string(), "终止");
    assert!(batch.reports[1].source.ends_with("b.json"));
    assert_eq!(batch.reports[1].status.to_string(), "已问询");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn runner_records_failures_without_aborting() {
    let dir = scratch_dir("failures");
    let good = write(&dir, "good.json", r#"{"status":"1"}"#);
    let bad = write(&dir, "bad.json", "<html>busy</html>");
    let missing = dir.join("missing.json").to_string_lossy().to_string();

    let runner = Runner::new(Options {
        inputs: vec![bad.clone(), good.clone(), missing.clone()],
        concurrency: 2,
        ..Options::default()
    })
    .unwrap();
    let batch = runner.run().await.unwrap();

    assert_eq!(batch.reports.len(), 1);
    assert_eq!(batch.reports[0].source, good);
    assert_eq!(batch.failures.len(), 2);
    assert_eq!(batch.failures[0].path, bad);
    assert!(batch.failures[0].error.contains("failed to decode payload"));
    assert_eq!(batch.failures[1].path, missing);
    assert!(batch.failures[1].error.contains("failed to read payload"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn explicit_overview_applies_to_every_input() {
    let dir = scratch_dir("overview");
    let one = write(&dir, "one.json", r#"{"status":"1"}"#);
    let two = write(&dir, "two.json", r#"{"status":"2"}"#);
    let overview = write(
        &dir,
        "shared.overview.json",
        r#"{"result":[{"stockAuditName":"共享公司","currStatus":"7","suspendStatus":"1"}]}"#,
    );

    let runner = Runner::new(Options {
        inputs: vec![one, two],
        overview: Some(overview),
        ..Options::default()
    })
    .unwrap();
    let batch = runner.run().await.unwrap();
    assert_eq!(batch.reports.len(), 2);
    for report in batch.reports.iter() {
        assert_eq!(report.company.as_deref(), Some("共享公司"));
        assert_eq!(report.status.markup(), "中止<br>（财报更新）");
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn broken_overview_aborts_the_batch() {
    let dir = scratch_dir("bad-overview");
    let one = write(&dir, "one.json", r#"{"status":"1"}"#);
    let overview = write(&dir, "empty.overview.json", r#"{"result":[]}"#);

    let runner = Runner::new(Options {
        inputs: vec![one],
        overview: Some(overview),
        ..Options::default()
    })
    .unwrap();
    assert!(runner.run().await.is_err());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn missing_input_dir_is_an_error() {
    let runner = Runner::new(Options {
        input_dir: Some("/nonexistent/kcbtrack/payloads".to_string()),
        ..Options::default()
    })
    .unwrap();
    assert!(runner.run().await.is_err());
}

#[test]
fn format_round_trip_through_extension() {
    for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Html] {
        let path = format!("report.{}", format.extension());
        assert_eq!(output::infer_format_from_path(&path), Some(format));
    }
}

const ANNOUNCEMENTS: &str = r#"jsonpCallback42495292({"result":[
    {"fileType":1,"fileTitle":"科创板上市委2021年第50次审议会议公告","filePath":"/information/c/202107/m.pdf","publishDate":"2021-07-29","stockAudit":[{"companyFullName":"公告公司"}]},
    {"fileType":2,"fileTitle":"科创板上市委2021年第50次审议会议结果公告","filePath":"/information/c/202108/r.pdf","publishDate":"2021-08-05","stockAudit":[{"companyFullName":"公告公司"}]}
]})"#;

#[tokio::test]
async fn announce_sibling_is_paired_and_not_an_input() {
    let dir = scratch_dir("announce-sibling");
    write(&dir, "942.json", r#"{"status":"3","subStatus":"1"}"#);
    write(&dir, "942.announce.json", ANNOUNCEMENTS);

    let runner = Runner::new(Options {
        input_dir: Some(dir.to_string_lossy().to_string()),
        ..Options::default()
    })
    .unwrap();
    let batch = runner.run().await.unwrap();

    assert!(batch.failures.is_empty());
    assert_eq!(batch.reports.len(), 1);
    let report = &batch.reports[0];
    assert_eq!(report.company.as_deref(), Some("公告公司"));
    assert_eq!(report.announcements.len(), 2);
    assert_eq!(report.announcements[1].date, "2021-08-05");
    assert_eq!(
        report.announcements[1].href,
        "http://static.sse.com.cn/stock/information/c/202108/r.pdf"
    );

    let html = String::from_utf8(output::render_html(report)).unwrap();
    assert!(html.contains("科创板上市委2021年第50次审议会议结果公告"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn explicit_announce_applies_to_every_input() {
    let dir = scratch_dir("announce-shared");
    let one = write(&dir, "one.json", r#"{"status":"1"}"#);
    let two = write(&dir, "two.json", r#"{"status":"2"}"#);
    let announce = write(&dir, "meetings.json", ANNOUNCEMENTS);

    let runner = Runner::new(Options {
        inputs: vec![one, two],
        announce: Some(announce),
        ..Options::default()
    })
    .unwrap();
    let batch = runner.run().await.unwrap();
    assert_eq!(batch.reports.len(), 2);
    assert!(batch.reports.iter().all(|r| r.announcements.len() == 2));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn broken_announce_sibling_fails_only_its_input() {
    let dir = scratch_dir("announce-broken");
    write(&dir, "a.json", r#"{"status":"1"}"#);
    write(&dir, "a.announce.json", "<html>busy</html>");
    write(&dir, "b.json", r#"{"status":"2"}"#);

    let runner = Runner::new(Options {
        input_dir: Some(dir.to_string_lossy().to_string()),
        ..Options::default()
    })
    .unwrap();
    let batch = runner.run().await.unwrap();
    assert_eq!(batch.reports.len(), 1);
    assert_eq!(batch.failures.len(), 1);
    assert!(batch.failures[0].error.contains("failed to decode announcements"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn broken_explicit_announce_aborts_the_batch() {
    let dir = scratch_dir("announce-explicit-broken");
    let input = write(&dir, "a.json", r#"{"status":"1"}"#);
    let announce = write(&dir, "meetings.json", "not json");

    let runner = Runner::new(Options {
        inputs: vec![input],
        announce: Some(announce),
        ..Options::default()
    })
    .unwrap();
    assert!(runner.run().await.is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
