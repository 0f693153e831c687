//! Syntax highlighting for fenced code blocks. Highlighting is class based
//! (the stylesheet lives with the theme), and any language syntect doesn't
//! know is rendered as plain text.

use std::sync::LazyLock;

use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};
use tracing::warn;

use crate::util::escape_html;

/// The language name used when a code block has no (known) language.
pub const PLAIN_TEXT: &str = "plaintext";

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Renders `code` as a `<pre><code>` block highlighted for `language`.
pub fn highlight_code(language: Option<&str>, code: &str) -> String {
    let syntax = language.and_then(|lang| find_syntax(&SYNTAX_SET, lang));
    let lang_name = match syntax {
        Some(_) => language.unwrap_or(PLAIN_TEXT).to_ascii_lowercase(),
        None => PLAIN_TEXT.to_owned(),
    };
    let syntax = syntax.unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());

    let highlighted = match classed_html(syntax, code) {
        Ok(html) => html,
        Err(err) => {
            warn!(language = %lang_name, error = %err, "highlighting failed, using plain text");
            escape_html(code)
        }
    };

    format!(
        "<pre><code class=\"hljs language-{}\">{}</code></pre>\n",
        escape_html(&lang_name),
        highlighted
    )
}

fn classed_html(syntax: &SyntaxReference, code: &str) -> Result<String, syntect::Error> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_known_language() {
        let html = highlight_code(Some("rust"), "fn main() {}\n");
        assert!(html.starts_with("<pre><code class=\"hljs language-rust\">"));
        assert!(html.contains("<span"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let html = highlight_code(Some("no-such-language"), "a < b\n");
        assert!(html.starts_with("<pre><code class=\"hljs language-plaintext\">"));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_missing_language() {
        let html = highlight_code(None, "plain\n");
        assert!(html.contains("language-plaintext"));
        assert!(html.contains("plain"));
    }
}
