//! The `examgate init` command: starter config and example question file.

use std::path::Path;

use anyhow::{Context, Result};

const STARTER_CONFIG: &str = r#"# examgate configuration

# Max concurrent similarity calls per grading run.
parallelism = 4

[grader]
# Base URL of the similarity-scoring service.
base_url = "http://localhost:8000"
# Bounded timeout per similarity call, in seconds.
timeout_secs = 20
"#;

const EXAMPLE_QUESTIONS: &str = r#"Question 1
Multiple Choice
Which keyword moves ownership of a value into a closure?
A. move
B. ref
C. static
D. dyn

Question 2
Long Form
Explain what the borrow checker guarantees about aliasing
and mutation, and why that matters for data races.
"#;

pub fn execute() -> Result<()> {
    write_if_absent(Path::new("examgate.toml"), STARTER_CONFIG)?;
    write_if_absent(
        Path::new("question-sets/example-questions.txt"),
        EXAMPLE_QUESTIONS,
    )?;
    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}
