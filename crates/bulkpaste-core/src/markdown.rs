//! Markdown to plain-text normalization.
//!
//! Some paste targets render raw text, so Markdown syntax is flattened before
//! submission: links become `label (url)`, and emphasis, code, header,
//! blockquote and bullet markers are dropped.
//!
//! ```
//! use bulkpaste_core::markdown::normalize;
//!
//! assert_eq!(
//!     normalize("See [docs](https://x.io/d) for **details**"),
//!     "See docs (https://x.io/d) for details"
//! );
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("markdown pattern must compile")
}

static FENCE: LazyLock<Regex> = LazyLock::new(|| re(r"(?m)^[ \t]*(?:```|~~~).*(?:\r?\n|$)"));
static HEADER: LazyLock<Regex> = LazyLock::new(|| re(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+"));
// Quote and bullet markers, any number of them stacked at the start of a line.
static LINE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?m)^([ \t]*)(?:>[ \t]?|[-*+][ \t]+)+"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| re(r#"!\[([^\]]*)\]\(([^)\s]+)(?:[ \t]+"[^"]*")?\)"#));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| re(r#"\[([^\]]+)\]\(([^)\s]+)(?:[ \t]+"[^"]*")?\)"#));
static AUTOLINK: LazyLock<Regex> = LazyLock::new(|| re(r"<(https?://[^>\s]+)>"));
static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| re(r"\*\*([^*\n]+)\*\*"));
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| re(r"__([^_\n]+)__"));
static STRIKE: LazyLock<Regex> = LazyLock::new(|| re(r"~~([^~\n]+)~~"));
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| re(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*"));
// Underscore emphasis only at word boundaries, so `snake_case` and URLs survive.
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(^|[\s(\[])_([^_\s](?:[^_\n]*[^_\s])?)_($|[\s.,;:!?)\]])")
});
static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| re(r"`([^`\n]+)`"));

/// Render `label (url)`, collapsing to the bare URL when both are the same.
fn labelled(label: &str, url: &str) -> String {
    let label = label.trim();
    if label.is_empty() || label == url {
        url.to_string()
    } else {
        format!("{label} ({url})")
    }
}

/// Apply `pattern` until the text stops changing.
///
/// Needed where a match consumes the separator the next match starts from.
/// Every replacement shortens the text, so the loop ends.
fn replace_until_stable(pattern: &Regex, text: &str, replacement: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = pattern.replace_all(&current, replacement);
        if next == current {
            return current;
        }
        current = next.into_owned();
    }
}

/// Flatten Markdown in `text` to plain text.
pub fn normalize(text: &str) -> String {
    let out = FENCE.replace_all(text, "");
    let out = LINE_MARKERS.replace_all(&out, "${1}");
    let out = HEADER.replace_all(&out, "");
    let out = IMAGE.replace_all(&out, |caps: &Captures<'_>| labelled(&caps[1], &caps[2]));
    let out = LINK.replace_all(&out, |caps: &Captures<'_>| labelled(&caps[1], &caps[2]));
    let out = AUTOLINK.replace_all(&out, "${1}");
    let out = BOLD_STARS.replace_all(&out, "${1}");
    let out = BOLD_UNDERSCORES.replace_all(&out, "${1}");
    let out = STRIKE.replace_all(&out, "${1}");
    let out = ITALIC_STAR.replace_all(&out, "${1}");
    let out = replace_until_stable(&ITALIC_UNDERSCORE, &out, "${1}${2}${3}");
    let out = CODE_SPAN.replace_all(&out, "${1}");
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_and_bold() {
        assert_eq!(
            normalize("See [docs](https://x.io/d) for **details**"),
            "See docs (https://x.io/d) for details"
        );
    }

    #[test]
    fn link_with_title_and_same_label() {
        assert_eq!(
            normalize(r#"[home](https://a.b "Home page")"#),
            "home (https://a.b)"
        );
        assert_eq!(
            normalize("[https://a.b/c](https://a.b/c)"),
            "https://a.b/c"
        );
    }

    #[test]
    fn images_and_autolinks() {
        assert_eq!(
            normalize("![logo](https://x.io/l.png) and <https://x.io>"),
            "logo (https://x.io/l.png) and https://x.io"
        );
        assert_eq!(normalize("![](https://x.io/l.png)"), "https://x.io/l.png");
    }

    #[test]
    fn headers_bullets_and_quotes() {
        let input = "# Title\n\n## Sub\n- one\n* two\n+ three\n> quoted";
        assert_eq!(normalize(input), "Title\n\nSub\none\ntwo\nthree\nquoted");
    }

    #[test]
    fn emphasis_and_code() {
        assert_eq!(
            normalize("*a* _b_ __c__ ~~d~~ `e`"),
            "a b c d e"
        );
    }

    #[test]
    fn code_fences_keep_their_body() {
        let input = "```rust\nfn main() {}\n```\nafter";
        assert_eq!(normalize(input), "fn main() {}\nafter");
    }

    #[test]
    fn leaves_snake_case_and_urls_alone() {
        let input = "call my_func_name at https://x.io/a_b_c";
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn arithmetic_stars_survive() {
        let input = "2 * 3 * 4 = 24";
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn idempotent_on_plain_text() {
        for s in [
            "plain text without markup",
            "See docs (https://x.io/d) for details",
            "line one\nline two",
            "price: 3 * 4 dollars",
            "email me at someone@example.com",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn nested_quotes_and_bullets_are_stripped_in_one_pass() {
        assert_eq!(normalize("> > replied text"), "replied text");
        assert_eq!(normalize(">> older reply"), "older reply");
        assert_eq!(normalize("- - x"), "x");
        assert_eq!(normalize("> - quoted item"), "quoted item");
        assert_eq!(normalize("> # Quoted title"), "Quoted title");
    }

    #[test]
    fn adjacent_underscore_emphasis() {
        assert_eq!(normalize("_one_ _two_"), "one two");
        assert_eq!(normalize("_a_ _b_ _c_"), "a b c");
    }

    #[test]
    fn idempotent_on_nested_markup() {
        for s in [
            "> > replied text",
            "- - x",
            "> - quoted item\n> > deeper",
            "_one_ _two_",
            "* * *",
            "  > indented quote",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn idempotent_after_markdown() {
        let once = normalize("# Hi\n- [a](https://a.io) **b** `c`");
        assert_eq!(normalize(&once), once);
        assert_eq!(once, "Hi\na (https://a.io) b c");
    }
}
