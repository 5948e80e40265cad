//! Rendering of ranked search results into a prompt-ready memory block.

use crate::search::SearchResult;

/// Render results into a compact text block for prompt injection.
///
/// Results at or below `similarity_floor` are dropped. Consecutive results
/// from the same knowledge file share one information header. Returns an
/// empty string when nothing clears the floor; callers treat that as "no
/// memory available."
pub fn format_memory(results: &[SearchResult], similarity_floor: f32) -> String {
    let passing: Vec<&SearchResult> = results
        .iter()
        .filter(|r| r.similarity > similarity_floor)
        .collect();

    if passing.is_empty() {
        return String::new();
    }

    let mut output = String::from("# Character memory\n");
    let mut last_source = String::new();

    for result in passing {
        let stem = result.source.strip_suffix(".json").unwrap_or(&result.source);
        let source_line = format!("### Information about '{}'\n", stem);
        if source_line != last_source {
            output.push_str(&source_line);
            last_source = source_line;
        }

        output.push_str(&format!("#### Topic: {}\n", result.header));
        output.push_str(&format!("Question: {}\n", result.question));
        output.push_str(&format!("Answer: {}\n", result.answer));
        output.push_str(&format!("Similarity to current query: {:.2}\n", result.similarity));
    }

    output
}
