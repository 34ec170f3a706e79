//! CSV download and the HTML results table.

use askama::Template;
use thiserror::Error;

use crate::screening::models::{ResultSet, DISPLAY_LABELS};

pub const CSV_FILENAME: &str = "recruiter_assistant_report.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// UTF-8 CSV with the localized header row and one record per candidate.
pub fn to_csv(results: &ResultSet) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(DISPLAY_LABELS)?;
    for row in &results.rows {
        writer.write_record(row.cells())?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))
}

#[derive(Template)]
#[template(path = "results.html")]
struct ResultsPage<'a> {
    columns: &'a [&'static str],
    rows: Vec<TableRow>,
    model: &'a str,
    evaluated_at: String,
}

struct TableRow {
    style: &'static str,
    cells: [String; 8],
}

/// Renders the table with one coloured row per verdict band.
pub fn to_html(results: &ResultSet) -> Result<String, ExportError> {
    let page = ResultsPage {
        columns: &DISPLAY_LABELS,
        rows: results
            .rows
            .iter()
            .map(|row| TableRow {
                style: row.band().style(),
                cells: row.cells(),
            })
            .collect(),
        model: &results.model.name,
        evaluated_at: results.evaluated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    };
    Ok(page.render()?)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::llm_client::{ModelSource, ResolvedModel};
    use crate::screening::models::VerdictBand;
    use crate::screening::parser::build_rows;

    fn results(raw: &str) -> ResultSet {
        ResultSet {
            evaluated_at: Utc::now(),
            model: ResolvedModel {
                name: "gemini-1.5-flash".to_string(),
                source: ModelSource::Default,
            },
            rows: build_rows(raw).unwrap(),
        }
    }

    #[test]
    fn test_csv_has_localized_headers_and_rows() {
        let set = results(
            r#"[{"Name":"A","Age_Exp":"1y","Strengths":"eager","Weaknesses":"no Go","Highlights":"none","Score":2,"Verdict":"Не варто спілкуватися","Risks":"skill gap"}]"#,
        );
        let csv = String::from_utf8(to_csv(&set).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Кандидат,Досвід,Плюси,Мінуси,Важливе,Бал,Вердикт,Ризики"
        );
        assert_eq!(
            lines.next().unwrap(),
            "A,1y,eager,no Go,none,2,Не варто спілкуватися,skill gap"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_quotes_commas() {
        let set = results(r#"[{"Name":"B","Strengths":["Rust","Go"],"Score":7}]"#);
        let csv = String::from_utf8(to_csv(&set).unwrap()).unwrap();
        assert!(csv.contains("\"Rust, Go\""));
    }

    #[test]
    fn test_html_colours_rows_by_band() {
        let set = results(
            r#"[{"Name":"Low","Score":2,"Verdict":"Не варто спілкуватися"},{"Name":"Top","Score":9,"Verdict":"Запросити"}]"#,
        );
        let html = to_html(&set).unwrap();
        assert!(html.contains(VerdictBand::Reject.style()));
        assert!(html.contains(VerdictBand::Invite.style()));
        assert!(html.contains("<th>Вердикт</th>"));
        assert!(html.find("Top").unwrap() < html.find("Low").unwrap());
    }

    #[test]
    fn test_html_escapes_cells() {
        let set = results(r#"[{"Name":"<script>alert(1)</script>","Score":5}]"#);
        let html = to_html(&set).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
