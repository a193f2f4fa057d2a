//! Interactive console prompt.

use std::io::{BufRead, Write};

use wikisent_core::error::Result;
use wikisent_vector::{render_matches, Pipeline};

pub const PROMPT: &str = "Please type a sentence: ";

/// Read sentences from `input` and print their nearest matches to `output`.
///
/// Stops at end of input or on an empty line. With `once` set, at most one
/// query is answered. Query failures are logged and the loop continues.
/// Returns the number of queries answered.
pub fn run_prompt_loop<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    mut input: R,
    mut output: W,
    top_k: usize,
    threshold: f64,
    once: bool,
) -> Result<usize> {
    let mut answered = 0;
    let mut line = String::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim_end_matches(['\n', '\r']);
        if text.is_empty() {
            break;
        }

        match pipeline.query(text, top_k) {
            Ok(matches) => {
                write!(output, "{}", render_matches(text, &matches, threshold))?;
                output.flush()?;
                answered += 1;
            }
            Err(e) => tracing::warn!(error = %e, "Query failed"),
        }

        if once {
            break;
        }
    }

    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use wikisent_vector::{FlatIndex, HashEncoder};

    fn pipeline() -> Pipeline {
        let pipeline = Pipeline::new(
            Arc::new(HashEncoder::new(1024).unwrap()),
            Arc::new(FlatIndex::new()),
        );
        pipeline.ingest_text("Paris is the capital of France.").unwrap();
        pipeline.ingest_text("The Nile is a river in Africa.").unwrap();
        pipeline
    }

    fn run(input: &str, top_k: usize, threshold: f64, once: bool) -> (usize, String) {
        let mut out = Vec::new();
        let n = run_prompt_loop(&pipeline(), Cursor::new(input), &mut out, top_k, threshold, once)
            .unwrap();
        (n, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_stops_on_empty_line() {
        let (n, out) = run("Paris is the capital of France.\n\nignored\n", 1, 0.0, false);
        assert_eq!(n, 1);
        assert_eq!(out.matches(PROMPT).count(), 2);
        assert!(!out.contains("ignored"));
    }

    #[test]
    fn test_stops_at_end_of_input() {
        let (n, out) = run("first\nsecond", 1, f64::NEG_INFINITY, false);
        assert_eq!(n, 2);
        assert!(out.contains("here's what we found for: first\n"));
        assert!(out.contains("here's what we found for: second\n"));
    }

    #[test]
    fn test_once_answers_single_query() {
        let (n, out) = run("The Nile is a river in Africa.\nmore\n", 1, 0.0, true);
        assert_eq!(n, 1);
        assert_eq!(out.matches(PROMPT).count(), 1);
        assert!(out.contains(">  0(0.00). The Nile is a river in Africa."));
    }

    #[test]
    fn test_crlf_input_matches_exactly() {
        let (_, out) = run("Paris is the capital of France.\r\n", 1, 0.0, true);
        assert!(out.contains(">  0(0.00). Paris is the capital of France."));
    }

    #[test]
    fn test_empty_input() {
        let (n, out) = run("", 5, 0.0, false);
        assert_eq!(n, 0);
        assert_eq!(out, PROMPT);
    }
}
