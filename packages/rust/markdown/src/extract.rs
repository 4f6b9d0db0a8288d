//! Extraction of code blocks, function docs and headed sections.
//!
//! Every extractor is a pure function over the cleaned page text. Matching
//! is pattern based and shortest-match, so unbalanced fences or unclosed
//! headings produce whatever the patterns happen to cover.

use std::sync::LazyLock;

use regex::Regex;

use pinedocs_shared::Section;

use crate::cleanup::clean_section_body;

/// Section bodies must mention at least one of these (case-insensitive).
pub const SECTION_KEYWORDS: [&str; 6] = [
    "pine",
    "script",
    "function",
    "indicator",
    "value",
    "parameter",
];

// ---------------------------------------------------------------------------
// Code blocks
// ---------------------------------------------------------------------------

/// Collect fenced blocks and re-wrap each non-empty one as a `pine` block.
pub fn extract_code_blocks(md: &str) -> Vec<String> {
    static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)```(?:pine)?(.*?)```").expect("valid regex")
    });

    FENCE_RE
        .captures_iter(md)
        .filter_map(|caps| {
            let code = caps[1].trim();
            if code.is_empty() {
                None
            } else {
                Some(format!("```pine\n{code}\n```"))
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Function docs
// ---------------------------------------------------------------------------

/// Collect `@function … @returns …` annotation runs, verbatim.
pub fn extract_function_docs(md: &str) -> Vec<String> {
    static FUNCTION_DOC_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)@function.*?@returns.*?\n").expect("valid regex")
    });

    FUNCTION_DOC_RE
        .find_iter(md)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Split out every `## [title]` heading and the text up to the next `##`.
///
/// The heading line itself (anything after the closing bracket) is not part
/// of the body. The body ends at the next `##` anywhere in the text, which
/// includes deeper headings such as `###`.
pub fn extract_sections(md: &str) -> Vec<Section> {
    static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)##\s+\[(.*?)\].*?\n").expect("valid regex")
    });

    let mut sections = Vec::new();
    let mut pos = 0;

    while let Some(caps) = HEADING_RE.captures_at(md, pos) {
        let Some(heading) = caps.get(0) else { break };

        let body_start = heading.end();
        let body_end = md[body_start..]
            .find("##")
            .map_or(md.len(), |offset| body_start + offset);

        sections.push(Section {
            title: caps[1].to_string(),
            body: md[body_start..body_end].to_string(),
        });

        pos = body_end;
    }

    sections
}

/// Whether a section body mentions any of [`SECTION_KEYWORDS`].
pub fn is_relevant_section(body: &str) -> bool {
    let lower = body.to_lowercase();
    SECTION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Keep relevant sections and clean their bodies (footnotes, links, trim).
pub fn filter_sections(sections: Vec<Section>) -> Vec<Section> {
    sections
        .into_iter()
        .filter(|s| is_relevant_section(&s.body))
        .map(|s| Section {
            body: clean_section_body(&s.body).trim().to_string(),
            title: s.title,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_block_retagged_as_pine() {
        let md = "Intro\n```pine\nplot(close)\n```\nOutro";
        assert_eq!(extract_code_blocks(md), vec!["```pine\nplot(close)\n```"]);
    }

    #[test]
    fn untagged_code_block_also_retagged() {
        let md = "```\n  x = 1  \n```";
        assert_eq!(extract_code_blocks(md), vec!["```pine\nx = 1\n```"]);
    }

    #[test]
    fn whitespace_only_block_dropped() {
        let md = "```pine\n   \n\t\n```\n```pine\nkeep\n```";
        assert_eq!(extract_code_blocks(md), vec!["```pine\nkeep\n```"]);
    }

    #[test]
    fn code_blocks_keep_order_and_duplicates() {
        let md = "```pine\na\n```\n```pine\nb\n```\n```pine\na\n```";
        assert_eq!(
            extract_code_blocks(md),
            vec!["```pine\na\n```", "```pine\nb\n```", "```pine\na\n```"]
        );
    }

    #[test]
    fn other_language_tag_stays_in_body() {
        // Only `pine` is recognized as a tag; anything else is code.
        let md = "```python\nprint(1)\n```";
        assert_eq!(extract_code_blocks(md), vec!["```pine\npython\nprint(1)\n```"]);
    }

    #[test]
    fn unterminated_fence_yields_nothing() {
        assert!(extract_code_blocks("```pine\nplot(close)\n").is_empty());
    }

    #[test]
    fn function_docs_extracted_verbatim() {
        let md = "//@function Adds two values.\n// @param a First.\n// @returns Sum.\nadd(a, b) => a + b\n";
        assert_eq!(
            extract_function_docs(md),
            vec!["@function Adds two values.\n// @param a First.\n// @returns Sum.\n"]
        );
    }

    #[test]
    fn function_doc_without_returns_is_ignored() {
        assert!(extract_function_docs("@function f\n@param x\n").is_empty());
    }

    #[test]
    fn sections_split_on_next_heading() {
        let md = "## [Intro](https://x/#intro)\nFirst body\n## [Next]\nSecond body\n";
        let sections = extract_sections(md);
        assert_eq!(
            sections,
            vec![
                Section {
                    title: "Intro".into(),
                    body: "First body\n".into(),
                },
                Section {
                    title: "Next".into(),
                    body: "Second body\n".into(),
                },
            ]
        );
    }

    #[test]
    fn section_body_stops_at_deeper_heading() {
        let md = "## [Top]\nbody\n### Sub\nignored";
        let sections = extract_sections(md);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "body\n");
    }

    #[test]
    fn heading_without_bracket_is_not_a_section() {
        assert!(extract_sections("## Plain heading\ntext\n").is_empty());
    }

    #[test]
    fn heading_without_newline_is_not_a_section() {
        assert!(extract_sections("## [Title] trailing").is_empty());
    }

    #[test]
    fn keyword_gate_is_case_insensitive() {
        assert!(is_relevant_section("Uses PINE script"));
        assert!(is_relevant_section("The default VALUE"));
        assert!(!is_relevant_section("Nothing relevant here."));
    }

    #[test]
    fn filter_drops_irrelevant_and_cleans_kept() {
        let sections = vec![
            Section {
                title: "Kept".into(),
                body: "\nA function[^1] call (https://example.com/x).\n\n".into(),
            },
            Section {
                title: "Dropped".into(),
                body: "About our company.\n".into(),
            },
        ];
        let kept = filter_sections(sections);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Kept");
        assert_eq!(kept[0].body, "A function call .");
    }
}
