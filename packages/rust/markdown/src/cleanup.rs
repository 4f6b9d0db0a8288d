//! Boilerplate removal for downloaded documentation pages.
//!
//! Each pass is a global regex substitution `&str -> String`, applied in a
//! fixed order. A later pass sees the output of the earlier ones.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Strip navigation chrome, copyright lines and "On this page" markers.
pub fn strip_boilerplate(md: &str) -> String {
    let before = md.len();

    let mut result = strip_version_picker(md);
    result = strip_nav_bullets(&result);
    result = strip_copyright(&result);
    result = strip_on_this_page(&result);

    debug!(before, after = result.len(), "boilerplate stripped");
    result
}

// ---------------------------------------------------------------------------
// Pass 1: Version picker / theme switcher block
// ---------------------------------------------------------------------------

/// Remove everything from `Version Version` through the next `Auto`.
fn strip_version_picker(md: &str) -> String {
    static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)Version Version.*?Auto").expect("valid regex")
    });

    VERSION_RE.replace_all(md, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: Navigation bullet links
// ---------------------------------------------------------------------------

/// Remove `* [` link bullets through the end of their line.
fn strip_nav_bullets(md: &str) -> String {
    static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
        // Not anchored: a bullet glued to preceding text is still chrome.
        Regex::new(r"\* \[.*?\n").expect("valid regex")
    });

    BULLET_RE.replace_all(md, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 3: Copyright footer
// ---------------------------------------------------------------------------

fn strip_copyright(md: &str) -> String {
    static COPYRIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"Copyright © .*?TradingView.*?\n").expect("valid regex")
    });

    COPYRIGHT_RE.replace_all(md, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 4: "On this page" marker
// ---------------------------------------------------------------------------

fn strip_on_this_page(md: &str) -> String {
    static ON_THIS_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"On this page.*?\n").expect("valid regex")
    });

    ON_THIS_PAGE_RE.replace_all(md, "").into_owned()
}

// ---------------------------------------------------------------------------
// Section body cleanup
// ---------------------------------------------------------------------------

/// Remove `[^n]` footnote markers and `(https://…)` link targets.
///
/// Surrounding text, including whitespace, is left untouched.
pub fn clean_section_body(body: &str) -> String {
    static FOOTNOTE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[\^.*?\]").expect("valid regex"));
    static LINK_TARGET_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\(https://.*?\)").expect("valid regex"));

    let without_footnotes = FOOTNOTE_RE.replace_all(body, "");
    LINK_TARGET_RE
        .replace_all(&without_footnotes, "")
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_picker_removed_across_lines() {
        let input = "Intro\nVersion Version 6\nv5\nv4\nTheme Light Dark Auto\nBody";
        assert_eq!(strip_version_picker(input), "Intro\n\nBody");
    }

    #[test]
    fn version_picker_is_shortest_match() {
        let input = "Version Version x Auto keep Auto";
        assert_eq!(strip_version_picker(input), " keep Auto");
    }

    #[test]
    fn nav_bullets_removed_through_newline() {
        let input = "# Title\n* [Welcome](https://example.com/welcome)\n* [FAQ](/faq)\nText\n";
        assert_eq!(strip_nav_bullets(input), "# Title\nText\n");
    }

    #[test]
    fn nav_bullet_without_trailing_newline_is_kept() {
        let input = "Text\n* [Last](/last)";
        assert_eq!(strip_nav_bullets(input), input);
    }

    #[test]
    fn plain_bullets_are_not_navigation() {
        let input = "* plain item\n- [x] task\n";
        assert_eq!(strip_nav_bullets(input), input);
    }

    #[test]
    fn copyright_line_removed() {
        let input = "Body\nCopyright © 2024 TradingView, Inc.\nAfter\n";
        assert_eq!(strip_copyright(input), "Body\nAfter\n");
    }

    #[test]
    fn copyright_without_tradingview_kept() {
        let input = "Copyright © 2024 Someone Else\n";
        assert_eq!(strip_copyright(input), input);
    }

    #[test]
    fn on_this_page_removed() {
        let input = "On this page\n## [Intro]\n";
        assert_eq!(strip_on_this_page(input), "## [Intro]\n");
    }

    #[test]
    fn strip_boilerplate_is_idempotent() {
        let input = "User Manual\nVersion Version 6 Auto\n* [Nav](/nav)\n\
                     Copyright © TradingView\nOn this page\n## [Intro]\nPine text\n";
        let once = strip_boilerplate(input);
        let twice = strip_boilerplate(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "User Manual\n\n## [Intro]\nPine text\n");
    }

    #[test]
    fn clean_section_body_removes_footnotes_and_links() {
        let input = "text[^1] more (https://example.com/x)";
        assert_eq!(clean_section_body(input), "text more ");
    }

    #[test]
    fn clean_section_body_keeps_plain_parentheses() {
        let input = "call ta.sma(close, 14) (see http://old.example.com)";
        assert_eq!(clean_section_body(input), input);
    }
}
