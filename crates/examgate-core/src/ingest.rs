//! Question ingestion: turns admin-provided sources into the canonical
//! question model.
//!
//! Two front ends feed the same model: a line-oriented scanner for
//! unstructured text (exported question dumps, pasted documents) and a
//! tabular front end for spreadsheet-shaped rows. Header and option
//! detection use a small hand-written two-token grammar (keyword + digits;
//! letter + separator) so the edge cases are enumerated, not discovered.

use std::collections::{HashMap, HashSet};

use crate::error::IngestError;
use crate::model::Question;

/// Metadata labels that appear between a question header and its body in
/// exported documents. Matched case-insensitively as substrings and dropped
/// while reading question text.
const NOISE_LABELS: [&str; 3] = ["multiple choice", "long form", "situational"];

/// Spreadsheet row numbering starts below a header row, so data index 0 is
/// row 2 in the source file.
const ROW_HEADER_OFFSET: usize = 2;

const OPTION_COLUMNS: [&str; 6] = [
    "option_a", "option_b", "option_c", "option_d", "option_e", "option_f",
];

// ---------------------------------------------------------------------------
// Unstructured-text front end
// ---------------------------------------------------------------------------

/// What the scanner is currently accumulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Before any options have appeared: plain lines extend the question
    /// text, noise labels are dropped.
    ReadingText,
    /// At least one option has been collected: plain lines are wrapped
    /// continuations of the last option, never question text.
    ReadingOption,
}

#[derive(Debug)]
struct QuestionDraft {
    id: u32,
    text: String,
    options: Vec<String>,
    state: ScanState,
}

impl QuestionDraft {
    fn finish(self) -> Question {
        let question_text = self.text.trim().to_string();
        if self.options.is_empty() {
            Question::Long {
                id: self.id,
                question_text,
                reference_answer: None,
            }
        } else {
            Question::Mcq {
                id: self.id,
                question_text,
                options: self.options,
                correct_answer: None,
            }
        }
    }
}

/// Scan a question header: the keyword `Question` (any case), optional
/// whitespace, one or more digits, then anything (`"Question 1"`,
/// `"Question11"`, `"Question 1 of 75"`).
///
/// Returns `None` when the line is not a header; `Some(None)` when it is a
/// header but the digits do not fit a `u32` (caller falls back to the
/// running sequence index).
fn scan_question_header(line: &str) -> Option<Option<u32>> {
    const KEYWORD: &str = "question";
    if line.len() < KEYWORD.len() || !line[..KEYWORD.len()].eq_ignore_ascii_case(KEYWORD) {
        return None;
    }
    let rest = line[KEYWORD.len()..].trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse::<u32>().ok())
}

/// Scan an option opener: a single letter A-E (either case), a `.` or `)`
/// separator, then whitespace and text (`"A. Paris"`, `"b) a borrow"`).
fn scan_option_start(line: &str) -> bool {
    let mut chars = line.chars();
    let letter_ok = matches!(chars.next(), Some('A'..='E' | 'a'..='e'));
    let separator_ok = matches!(chars.next(), Some('.' | ')'));
    let rest = chars.as_str();
    letter_ok
        && separator_ok
        && rest.starts_with(|c: char| c.is_whitespace())
        && !rest.trim_start().is_empty()
}

fn is_noise_label(line: &str) -> bool {
    let lowered = line.to_lowercase();
    NOISE_LABELS.iter().any(|label| lowered.contains(label))
}

/// Parse loosely-structured question text into the canonical model.
///
/// A document with zero recognized question headers yields an empty list;
/// the caller treats that as "no questions detected", not a parse error.
pub fn parse_text(raw: &str) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::new();
    let mut current: Option<QuestionDraft> = None;

    let lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());

    for line in lines {
        if let Some(parsed_id) = scan_question_header(line) {
            if let Some(draft) = current.take() {
                questions.push(draft.finish());
            }
            let id = parsed_id.unwrap_or(questions.len() as u32 + 1);
            current = Some(QuestionDraft {
                id,
                text: String::new(),
                options: Vec::new(),
                state: ScanState::ReadingText,
            });
            continue;
        }

        // Preamble before the first header is ignored.
        let Some(draft) = current.as_mut() else {
            continue;
        };

        if scan_option_start(line) {
            draft.state = ScanState::ReadingOption;
            draft.options.push(line.to_string());
            continue;
        }

        match draft.state {
            // Once inside options, a plain line is a wrapped continuation of
            // the last option and never falls back to question text.
            ScanState::ReadingOption => {
                if let Some(last) = draft.options.last_mut() {
                    last.push(' ');
                    last.push_str(line);
                }
            }
            ScanState::ReadingText => {
                if is_noise_label(line) {
                    continue;
                }
                if !draft.text.is_empty() {
                    draft.text.push('\n');
                }
                draft.text.push_str(line);
            }
        }
    }

    if let Some(draft) = current.take() {
        questions.push(draft.finish());
    }

    questions
}

// ---------------------------------------------------------------------------
// Tabular front end
// ---------------------------------------------------------------------------

fn field<'a>(row: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    row.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Parse spreadsheet-shaped rows (string-keyed, one row per question) into
/// the canonical model. Errors carry 1-based source row numbers matching
/// common spreadsheet line numbering (data index + header row).
pub fn parse_rows(rows: &[HashMap<String, String>]) -> Result<Vec<Question>, IngestError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let row_no = index + ROW_HEADER_OFFSET;
            let id = index as u32 + 1;

            let kind = field(row, "type")
                .map(str::to_lowercase)
                .ok_or(IngestError::MissingField {
                    row: row_no,
                    field: "type",
                })?;
            let question_text = field(row, "question")
                .ok_or(IngestError::MissingField {
                    row: row_no,
                    field: "question",
                })?
                .to_string();

            // Blank option cells are dropped; column order is preserved.
            let options: Vec<String> = OPTION_COLUMNS
                .iter()
                .filter_map(|&col| field(row, col))
                .map(str::to_string)
                .collect();
            let answer = field(row, "answer").map(str::to_string);

            match kind.as_str() {
                "mcq" => {
                    if options.len() < 2 {
                        return Err(IngestError::InsufficientOptions {
                            row: row_no,
                            found: options.len(),
                        });
                    }
                    // The answer must be present but is not required to
                    // string-match an option verbatim; strict consistency is
                    // a caller concern (see `validate_questions`).
                    let correct_answer = answer.ok_or(IngestError::MissingField {
                        row: row_no,
                        field: "answer",
                    })?;
                    Ok(Question::Mcq {
                        id,
                        question_text,
                        options,
                        correct_answer: Some(correct_answer),
                    })
                }
                "long" => Ok(Question::Long {
                    id,
                    question_text,
                    reference_answer: answer,
                }),
                _ => Err(IngestError::UnknownType {
                    row: row_no,
                    value: kind,
                }),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A non-fatal finding from question-set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<u32>,
    /// Warning message.
    pub message: String,
}

/// Validate an ingested question set for issues that do not block publishing
/// but will surprise someone at grading time.
pub fn validate_questions(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for q in questions {
        if !seen_ids.insert(q.id()) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id()),
                message: format!("duplicate question id: {}", q.id()),
            });
        }
    }

    for q in questions {
        if q.question_text().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id()),
                message: "question text is empty".into(),
            });
        }

        match q {
            Question::Mcq {
                id,
                options,
                correct_answer,
                ..
            } => {
                if options.len() < 2 {
                    warnings.push(ValidationWarning {
                        question_id: Some(*id),
                        message: format!("only {} option(s) collected", options.len()),
                    });
                }
                match correct_answer {
                    None => warnings.push(ValidationWarning {
                        question_id: Some(*id),
                        message: "no answer key; question will not count toward the total".into(),
                    }),
                    Some(answer) if !options.iter().any(|o| o == answer) => {
                        warnings.push(ValidationWarning {
                            question_id: Some(*id),
                            message: "answer key does not match any option verbatim".into(),
                        })
                    }
                    Some(_) => {}
                }
            }
            Question::Long {
                id,
                reference_answer,
                ..
            } => {
                if reference_answer.is_none() {
                    warnings.push(ValidationWarning {
                        question_id: Some(*id),
                        message: "no reference answer; responses cannot receive partial credit"
                            .into(),
                    });
                }
            }
        }
    }

    warnings
}
