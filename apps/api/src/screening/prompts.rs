// Evaluation prompt and the candidate blocks embedded in it.
// The prompt is Ukrainian and asks for Ukrainian output; only the JSON keys
// stay English so the parser can read them.

use std::fmt;

use crate::llm_client::prompts::JSON_ARRAY_DIRECTIVE;
use crate::screening::models::{VERDICT_INVITE, VERDICT_REJECT, VERDICT_RESERVE};

/// Hard cap on characters embedded per candidate.
pub const MAX_CANDIDATE_CHARS: usize = 6000;

/// Where a candidate's text came from. Rendered as the block heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    File(String),
    Pasted,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::File(name) => write!(f, "File: {name}"),
            CandidateSource::Pasted => f.write_str("Pasted Text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBlock {
    pub source: CandidateSource,
    /// Flattened to one line and cut to `MAX_CANDIDATE_CHARS`.
    pub text: String,
    /// Characters lost to the cut; zero when the text fit.
    pub dropped_chars: usize,
}

impl CandidateBlock {
    pub fn new(source: CandidateSource, raw_text: &str) -> Self {
        let text = flatten_and_truncate(raw_text, MAX_CANDIDATE_CHARS);
        let dropped_chars = raw_text.chars().count() - text.chars().count();
        Self {
            source,
            text,
            dropped_chars,
        }
    }

    /// Human-readable note for a block that was cut, if it was.
    pub fn truncation_note(&self) -> Option<String> {
        (self.dropped_chars > 0).then(|| {
            format!(
                "truncated to {MAX_CANDIDATE_CHARS} characters; {} dropped",
                self.dropped_chars
            )
        })
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn render(&self) -> String {
        format!("\n--- {} ---\n{}", self.source, self.text)
    }
}

/// Replaces line breaks with spaces, then keeps the first `max_chars`
/// characters. The cut is not sentence-aware.
fn flatten_and_truncate(text: &str, max_chars: usize) -> String {
    text.replace(['\r', '\n'], " ").chars().take(max_chars).collect()
}

/// Job description plus every labelled candidate block for one run.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub job_description: String,
    pub candidates: Vec<CandidateBlock>,
}

impl EvaluationRequest {
    pub fn candidates_text(&self) -> String {
        self.candidates.iter().map(CandidateBlock::render).collect()
    }

    pub fn has_candidate_material(&self) -> bool {
        self.candidates.iter().any(|c| !c.is_blank())
    }
}

/// Assembles the full instruction: role, strictness, data, output schema and
/// the trailing JSON-array directive.
pub fn build_evaluation_prompt(request: &EvaluationRequest) -> String {
    format!(
        r#"
##Роль
Ти — ШІ-асистент рекрутера.
##Задачі
Допомогти в попередній оцінці кандидатів.
!!ВАЖЛИВО: Оцінюй максимально строго. Відсів важливіше приємних коментарів.
##Дані
Вакансія: {job}
Резюме: {candidates}
##Результат (JSON)
Поверни масив об'єктів:
1. "Name"
2. "Age_Exp" (Вік/Досвід)
3. "Strengths" (Теги плюсів)
4. "Weaknesses" (Теги мінусів)
5. "Highlights" (Важливе/Незвичне)
6. "Score" (1-10)
7. "Verdict" ("{reject}" [1-3], "{reserve}" [4-6], "{invite}" [7-10])
8. "Risks"
Мова: Українська.

{directive}"#,
        job = request.job_description,
        candidates = request.candidates_text(),
        reject = VERDICT_REJECT,
        reserve = VERDICT_RESERVE,
        invite = VERDICT_INVITE,
        directive = JSON_ARRAY_DIRECTIVE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(candidates: Vec<CandidateBlock>) -> EvaluationRequest {
        EvaluationRequest {
            job_description: "Senior backend engineer, 5 years Go experience".to_string(),
            candidates,
        }
    }

    #[test]
    fn test_truncates_to_max_chars() {
        let long = "я".repeat(MAX_CANDIDATE_CHARS + 500);
        let block = CandidateBlock::new(CandidateSource::File("cv.pdf".into()), &long);
        assert_eq!(block.text.chars().count(), MAX_CANDIDATE_CHARS);
        assert_eq!(block.dropped_chars, 500);
        assert!(block.truncation_note().unwrap().contains("500 dropped"));
    }

    #[test]
    fn test_short_text_has_no_truncation_note() {
        let block = CandidateBlock::new(CandidateSource::Pasted, "line one\r\nline two");
        assert_eq!(block.dropped_chars, 0);
        assert_eq!(block.truncation_note(), None);
    }

    #[test]
    fn test_newlines_flattened_before_truncation() {
        let block = CandidateBlock::new(CandidateSource::Pasted, "line one\nline two\r\nthree");
        assert_eq!(block.text, "line one line two  three");
    }

    #[test]
    fn test_block_heading_labels() {
        let file = CandidateBlock::new(CandidateSource::File("ivan.docx".into()), "text");
        let pasted = CandidateBlock::new(CandidateSource::Pasted, "text");
        assert_eq!(file.render(), "\n--- File: ivan.docx ---\ntext");
        assert_eq!(pasted.render(), "\n--- Pasted Text ---\ntext");
    }

    #[test]
    fn test_prompt_contains_one_block_per_candidate() {
        let req = request(vec![
            CandidateBlock::new(CandidateSource::File("a.pdf".into()), "Junior dev"),
            CandidateBlock::new(CandidateSource::File("b.docx".into()), "Go lead"),
            CandidateBlock::new(CandidateSource::Pasted, "Intern"),
        ]);
        let prompt = build_evaluation_prompt(&req);
        assert_eq!(prompt.matches("\n--- ").count(), 3);
        assert!(prompt.contains("--- File: a.pdf ---\nJunior dev"));
        assert!(prompt.contains("--- Pasted Text ---\nIntern"));
    }

    #[test]
    fn test_prompt_embeds_job_and_schema_then_directive() {
        let req = request(vec![CandidateBlock::new(
            CandidateSource::Pasted,
            "Junior dev, 1 year Python, no Go",
        )]);
        let prompt = build_evaluation_prompt(&req);

        assert!(prompt.contains("Вакансія: Senior backend engineer, 5 years Go experience"));
        assert!(prompt.contains("максимально строго"));
        let fields = [
            "\"Name\"",
            "\"Age_Exp\"",
            "\"Strengths\"",
            "\"Weaknesses\"",
            "\"Highlights\"",
            "\"Score\"",
            "\"Verdict\"",
            "\"Risks\"",
        ];
        let positions: Vec<usize> = fields.iter().map(|f| prompt.find(f).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "schema out of order");
        assert!(prompt.contains("\"Не варто спілкуватися\" [1-3]"));
        assert!(prompt.trim_end().ends_with(JSON_ARRAY_DIRECTIVE));
    }

    #[test]
    fn test_blank_candidates_are_not_material() {
        let req = request(vec![
            CandidateBlock::new(CandidateSource::File("scan.pdf".into()), ""),
            CandidateBlock::new(CandidateSource::Pasted, "  \n "),
        ]);
        assert!(!req.has_candidate_material());
    }
}
