//! Candidate verdict rows and the per-session result set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::llm_client::ResolvedModel;

/// Localized column labels, in schema order:
/// Name, Age_Exp, Strengths, Weaknesses, Highlights, Score, Verdict, Risks.
pub const DISPLAY_LABELS: [&str; 8] = [
    "Кандидат",
    "Досвід",
    "Плюси",
    "Мінуси",
    "Важливе",
    "Бал",
    "Вердикт",
    "Ризики",
];

/// JSON keys the model is asked to return, in `DISPLAY_LABELS` order.
pub const SCHEMA_KEYS: [&str; 8] = [
    "Name",
    "Age_Exp",
    "Strengths",
    "Weaknesses",
    "Highlights",
    "Score",
    "Verdict",
    "Risks",
];

/// Verdict labels the model is asked to use, one per band.
pub const VERDICT_REJECT: &str = "Не варто спілкуватися";
pub const VERDICT_RESERVE: &str = "Резерв";
pub const VERDICT_INVITE: &str = "Запросити";

/// One row of the model's output. Field names match the requested schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateVerdict {
    #[serde(rename = "Name", default, deserialize_with = "cell_text")]
    pub name: String,
    #[serde(rename = "Age_Exp", default, deserialize_with = "cell_text")]
    pub age_exp: String,
    #[serde(rename = "Strengths", default, deserialize_with = "cell_text")]
    pub strengths: String,
    #[serde(rename = "Weaknesses", default, deserialize_with = "cell_text")]
    pub weaknesses: String,
    #[serde(rename = "Highlights", default, deserialize_with = "cell_text")]
    pub highlights: String,
    #[serde(rename = "Score", default)]
    pub score: Score,
    #[serde(rename = "Verdict", default, deserialize_with = "cell_text")]
    pub verdict: String,
    #[serde(rename = "Risks", default, deserialize_with = "cell_text")]
    pub risks: String,
}

impl CandidateVerdict {
    /// Cell values in `DISPLAY_LABELS` order.
    pub fn cells(&self) -> [String; 8] {
        [
            self.name.clone(),
            self.age_exp.clone(),
            self.strengths.clone(),
            self.weaknesses.clone(),
            self.highlights.clone(),
            self.score.display(),
            self.verdict.clone(),
            self.risks.clone(),
        ]
    }

    /// Colour band: from the numeric score when there is one, otherwise from
    /// the verdict text, otherwise reserve.
    pub fn band(&self) -> VerdictBand {
        self.score
            .numeric()
            .map(VerdictBand::from_score)
            .or_else(|| VerdictBand::from_verdict_text(&self.verdict))
            .unwrap_or(VerdictBand::Reserve)
    }

    /// False only when both a numeric score and a recognisable verdict are
    /// present and they name different bands.
    pub fn verdict_consistent(&self) -> bool {
        match (
            self.score.numeric(),
            VerdictBand::from_verdict_text(&self.verdict),
        ) {
            (Some(score), Some(band)) => VerdictBand::from_score(score) == band,
            _ => true,
        }
    }
}

/// Model-reported score. The raw JSON value is kept for display so the
/// localized table shows exactly what the model sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    raw: Value,
}

impl Score {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Numbers and numeric strings; anything else is `None`.
    pub fn numeric(&self) -> Option<f64> {
        match &self.raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match &self.raw {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Score::new)
    }
}

/// Models often answer tag fields with arrays; those are joined for display.
fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_cell(&Value::deserialize(deserializer)?))
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_cell)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictBand {
    Reject,
    Reserve,
    Invite,
}

impl VerdictBand {
    /// 1–3 reject, 4–6 reserve, 7–10 invite. Fractional scores fall into the
    /// band whose lower bound they have reached.
    pub fn from_score(score: f64) -> Self {
        if score < 4.0 {
            VerdictBand::Reject
        } else if score < 7.0 {
            VerdictBand::Reserve
        } else {
            VerdictBand::Invite
        }
    }

    pub fn from_verdict_text(verdict: &str) -> Option<Self> {
        let verdict = verdict.to_lowercase();
        if verdict.contains("запросити") {
            Some(VerdictBand::Invite)
        } else if verdict.contains("не варто") {
            Some(VerdictBand::Reject)
        } else if verdict.contains("резерв") {
            Some(VerdictBand::Reserve)
        } else {
            None
        }
    }

    /// Inline CSS for rows in this band.
    pub fn style(self) -> &'static str {
        match self {
            VerdictBand::Invite => "background-color: #dcfce7; color: #166534; font-weight: bold",
            VerdictBand::Reject => "background-color: #fee2e2; color: #991b1b",
            VerdictBand::Reserve => "background-color: #fef9c3; color: #854d0e",
        }
    }
}

/// Sorted verdicts from one evaluation run. Replaced wholesale by the next run.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    pub evaluated_at: DateTime<Utc>,
    pub model: ResolvedModel,
    pub rows: Vec<CandidateVerdict>,
}

/// A row keyed by localized labels, plus presentation hints.
#[derive(Debug, Serialize)]
pub struct DisplayRow<'a> {
    #[serde(rename = "Кандидат")]
    pub name: &'a str,
    #[serde(rename = "Досвід")]
    pub age_exp: &'a str,
    #[serde(rename = "Плюси")]
    pub strengths: &'a str,
    #[serde(rename = "Мінуси")]
    pub weaknesses: &'a str,
    #[serde(rename = "Важливе")]
    pub highlights: &'a str,
    #[serde(rename = "Бал")]
    pub score: &'a Value,
    #[serde(rename = "Вердикт")]
    pub verdict: &'a str,
    #[serde(rename = "Ризики")]
    pub risks: &'a str,
    pub band: VerdictBand,
    pub style: &'static str,
    pub verdict_consistent: bool,
}

impl<'a> From<&'a CandidateVerdict> for DisplayRow<'a> {
    fn from(row: &'a CandidateVerdict) -> Self {
        let band = row.band();
        DisplayRow {
            name: &row.name,
            age_exp: &row.age_exp,
            strengths: &row.strengths,
            weaknesses: &row.weaknesses,
            highlights: &row.highlights,
            score: row.score.raw(),
            verdict: &row.verdict,
            risks: &row.risks,
            band,
            style: band.style(),
            verdict_consistent: row.verdict_consistent(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResultTable<'a> {
    pub evaluated_at: DateTime<Utc>,
    pub model: &'a ResolvedModel,
    pub columns: [&'static str; 8],
    pub rows: Vec<DisplayRow<'a>>,
}

impl ResultSet {
    pub fn table(&self) -> ResultTable<'_> {
        ResultTable {
            evaluated_at: self.evaluated_at,
            model: &self.model,
            columns: DISPLAY_LABELS,
            rows: self.rows.iter().map(DisplayRow::from).collect(),
        }
    }
}
