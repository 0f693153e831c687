//! Converts post bodies from markdown to HTML.
//!
//! [`render`] is pure: the same markdown always yields the same HTML.
//! [`render_with_embeds`] additionally expands embed placeholders, which may
//! hit the network through an [`EmbedProvider`].

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag};

use crate::embed::{expand_embeds, EmbedProvider};
use crate::highlight::highlight_code;

const IMG_OPEN: &str = "<img ";
const LAZY_IMG_OPEN: &str = "<img loading=\"lazy\" ";

/// Converts markdown to HTML. Fenced code blocks are syntax highlighted and
/// every `<img>` tag is marked for lazy loading.
pub fn render(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut converter = EventConverter::default();
    let events = Parser::new_ext(markdown, options).filter_map(|ev| converter.convert(ev));

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out.replace(IMG_OPEN, LAZY_IMG_OPEN)
}

/// [`render`] followed by embed expansion (see [`crate::embed`]).
pub fn render_with_embeds(markdown: &str, provider: &dyn EmbedProvider) -> String {
    expand_embeds(&render(markdown), provider)
}

/// Buffers the text of code blocks so the whole block can be handed to the
/// highlighter and emitted as a single HTML event.
#[derive(Default)]
struct EventConverter {
    code_block: Option<CodeBlock>,
}

struct CodeBlock {
    language: Option<String>,
    code: String,
}

impl EventConverter {
    fn convert<'a>(&mut self, ev: Event<'a>) -> Option<Event<'a>> {
        match ev {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_owned)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code_block = Some(CodeBlock {
                    language,
                    code: String::new(),
                });
                None
            }
            Event::End(Tag::CodeBlock(_)) => self.code_block.take().map(|block| {
                Event::Html(CowStr::from(highlight_code(
                    block.language.as_deref(),
                    &block.code,
                )))
            }),
            Event::Text(text) if self.code_block.is_some() => {
                if let Some(block) = self.code_block.as_mut() {
                    block.code.push_str(&text);
                }
                None
            }
            _ => Some(ev),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const BODY: &str = "# Title

Some *text* with ![a cat](/cat.png) in it.

| a | b |
|---|---|
| 1 | 2 |

```js
const x = 1
```

```
plain <code>
```
";

    #[test]
    fn test_render_basic_markdown() {
        let html = render(BODY);
        assert!(html.contains("<h1>Title</h1>"), "{}", html);
        assert!(html.contains("<em>text</em>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_images_are_lazy() {
        let html = render(BODY);
        assert!(html.contains("<img loading=\"lazy\" src=\"/cat.png\""), "{}", html);
        assert!(!html.contains("<img src"));
    }

    #[test]
    fn test_code_blocks_are_highlighted() {
        let html = render(BODY);
        assert!(html.contains("class=\"hljs language-js\""), "{}", html);
        assert!(html.contains("class=\"hljs language-plaintext\""));
        assert!(html.contains("plain &lt;code&gt;"));
    }

    #[test]
    fn test_render_is_idempotent() {
        assert_eq!(render(BODY), render(BODY));
    }
}
