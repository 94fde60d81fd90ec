//! Grounding context and prompt assembly.

use store::SearchResult;

/// Render retrieved passages in ranked order, one block per source:
///
/// ```text
/// [Source 1 - text]
/// Photosynthesis converts light into chemical energy.
///
/// [Source 2 - image]
/// Diagram of a leaf cross-section.
/// ```
///
/// No results renders as an empty string.
pub fn build_context(sources: &[SearchResult]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            format!(
                "[Source {} - {}]\n{}",
                i + 1,
                source.content_type,
                source.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fixed instruction template wrapping `context` and the raw `query`.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "You are a helpful assistant that answers questions based on the provided context.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {query}\n\
         \n\
         Instructions:\n\
         - Answer the question based on the context provided\n\
         - If the context doesn't contain enough information, say so\n\
         - Be concise but comprehensive\n\
         - Cite which source(s) you're using when relevant\n\
         \n\
         Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: i64, content_type: &str, content: &str) -> SearchResult {
        SearchResult {
            id,
            content: content.into(),
            metadata: "{}".into(),
            content_type: content_type.into(),
            distance: 0.0,
        }
    }

    #[test]
    fn context_numbers_sources_in_rank_order() {
        let context = build_context(&[
            source(4, "text", "Plants use sunlight."),
            source(2, "image", "Leaf diagram."),
        ]);
        assert_eq!(
            context,
            "[Source 1 - text]\nPlants use sunlight.\n\n[Source 2 - image]\nLeaf diagram."
        );
    }

    #[test]
    fn empty_sources_give_empty_context() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn prompt_contains_context_query_and_instructions() {
        let prompt = build_prompt("[Source 1 - text]\nX", "What is X?");
        assert!(prompt.starts_with(
            "You are a helpful assistant that answers questions based on the provided context.\n\nContext:\n[Source 1 - text]\nX\n\nQuestion: What is X?\n\nInstructions:\n"
        ));
        assert!(prompt.contains("- If the context doesn't contain enough information, say so\n"));
        assert!(prompt.contains("- Cite which source(s) you're using when relevant\n"));
        assert!(prompt.ends_with("\n\nAnswer:"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt("c", "q"), build_prompt("c", "q"));
    }
}
