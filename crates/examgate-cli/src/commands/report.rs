//! The `examgate report` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use examgate_core::report::{
    load_submissions_json, load_test_json, marks_report_rows, test_report_rows,
};

pub fn execute(test_path: PathBuf, submissions_path: PathBuf, marks: bool) -> Result<()> {
    let test = load_test_json(&test_path)?;
    let submissions = load_submissions_json(&submissions_path)?;

    if submissions.is_empty() {
        println!("No submissions for test \"{}\".", test.id);
        return Ok(());
    }

    let mut table = Table::new();
    if marks {
        let mut header = vec!["Student Name".to_string(), "Email".to_string()];
        header.push("Total Marks".into());
        header.push("Max Marks".into());
        header.extend((1..=test.questions.len()).map(|n| format!("Q{n}")));
        table.set_header(header);

        for row in marks_report_rows(&test, &submissions) {
            let mut cells = vec![
                row.student_name,
                row.email,
                format!("{}", row.total_marks),
                row.max_marks.to_string(),
            ];
            cells.extend(row.per_question.iter().map(|m| format!("{m}")));
            table.add_row(cells);
        }
    } else {
        table.set_header(["Student Name", "Email", "Submitted At", "Total Score", "Percentage"]);
        for row in test_report_rows(&test, &submissions) {
            table.add_row([
                row.student_name,
                row.email,
                row.submitted_at.to_rfc3339(),
                row.total_score,
                row.percentage,
            ]);
        }
    }

    println!("Report for \"{}\" ({})", test.title, test.id);
    println!("{table}");

    Ok(())
}
