//! Content parsing: raw bundle text → HTML + metadata + inferred title.
//!
//! The walker and factory only depend on the [`ContentParser`] trait, so a
//! site can plug in any text format. [`MarkdownParser`] is the default:
//!
//! ```text
//! ---
//! title: Hello world
//! date: 2024-03-01 09:00
//! tags: rust, web
//! ---
//!
//! # Hello world
//!
//! Body text, rendered with pulldown-cmark.
//! ```
//!
//! Front matter is a block of `key: value` lines fenced by `---`. Keys and
//! values are trimmed and one pair of surrounding quotes is stripped from
//! values. The first level-one heading becomes the inferred title.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html};
use std::collections::BTreeMap;
use std::fmt;

/// Output of a [`ContentParser`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContent {
    pub html: String,
    pub metadata: BTreeMap<String, String>,
    /// Title inferred from the document itself (first `# heading`).
    pub title: Option<String>,
}

/// Converts raw document text into [`ParsedContent`].
///
/// Must be `Sync`: a single parser is shared by every concurrent unit of a
/// walk.
pub trait ContentParser: Send + Sync {
    fn parse(&self, input: &str) -> ParsedContent;

    /// HTML only, discarding metadata.
    fn html(&self, input: &str) -> String {
        self.parse(input).html
    }
}

/// Text transform applied to the raw input before parsing.
pub type Modifier = Box<dyn Fn(String) -> String + Send + Sync>;

/// Markdown parser with front matter support.
pub struct MarkdownParser {
    hard_breaks: bool,
    modifiers: Vec<Modifier>,
}

impl fmt::Debug for MarkdownParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownParser")
            .field("hard_breaks", &self.hard_breaks)
            .field("modifiers", &self.modifiers.len())
            .finish()
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self {
            hard_breaks: false,
            modifiers: Vec::new(),
        }
    }

    /// Render single newlines inside paragraphs as `<br />`.
    pub fn with_hard_breaks(mut self, hard_breaks: bool) -> Self {
        self.hard_breaks = hard_breaks;
        self
    }

    /// Register a pre-input modifier. Modifiers run in registration order.
    pub fn add_pre_input_modifier(
        &mut self,
        modifier: impl Fn(String) -> String + Send + Sync + 'static,
    ) {
        self.modifiers.push(Box::new(modifier));
    }

    fn apply_modifiers(&self, input: &str) -> String {
        self.modifiers
            .iter()
            .fold(input.to_string(), |text, modifier| modifier(text))
    }
}

impl ContentParser for MarkdownParser {
    fn parse(&self, input: &str) -> ParsedContent {
        let input = self.apply_modifiers(input);
        let (metadata, body) = split_front_matter(&input);

        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_TASKLISTS;
        let events: Vec<Event<'_>> = Parser::new_ext(body, options)
            .map(|event| match event {
                Event::SoftBreak if self.hard_breaks => Event::HardBreak,
                other => other,
            })
            .collect();

        let title = first_heading(&events);
        let mut html = String::with_capacity(body.len() * 3 / 2);
        md_html::push_html(&mut html, events.into_iter());

        ParsedContent {
            html,
            metadata,
            title,
        }
    }
}

/// Split a leading `---` fenced block off `input`.
///
/// Returns the parsed pairs and the remaining body. Input without a closed
/// fence is all body.
fn split_front_matter(input: &str) -> (BTreeMap<String, String>, &str) {
    let mut metadata = BTreeMap::new();
    let trimmed = input.trim_start_matches('\u{feff}');
    let Some(rest) = trimmed
        .strip_prefix("---\n")
        .or_else(|| trimmed.strip_prefix("---\r\n"))
    else {
        return (metadata, input);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim() == "---" {
            return (metadata, &rest[offset..]);
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim();
            if !key.is_empty() {
                metadata.insert(key.to_string(), unquote(value.trim()).to_string());
            }
        }
    }

    (BTreeMap::new(), input)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Plain text of the first level-one heading.
fn first_heading(events: &[Event<'_>]) -> Option<String> {
    let start = events.iter().position(|e| {
        matches!(
            e,
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            })
        )
    })?;

    let mut title = String::new();
    for event in &events[start + 1..] {
        match event {
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => break,
            Event::Text(text) | Event::Code(text) => title.push_str(text),
            Event::SoftBreak | Event::HardBreak => title.push(' '),
            _ => {}
        }
    }

    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_matter_is_extracted() {
        let parsed = MarkdownParser::new().parse(
            "---\ntitle: Hello: World\ndescription: \"Quoted\"\n---\n\nBody text.\n",
        );
        assert_eq!(parsed.metadata["title"], "Hello: World");
        assert_eq!(parsed.metadata["description"], "Quoted");
        assert_eq!(parsed.html.trim(), "<p>Body text.</p>");
    }

    #[test]
    fn no_front_matter_means_empty_metadata() {
        let parsed = MarkdownParser::new().parse("Just text.");
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn unclosed_front_matter_is_body() {
        let parsed = MarkdownParser::new().parse("---\ntitle: Nope\n\nText");
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn title_inferred_from_first_h1() {
        let parsed = MarkdownParser::new().parse("## Sub\n\n# The `Real` Title\n\n# Second\n");
        assert_eq!(parsed.title.as_deref(), Some("The Real Title"));
    }

    #[test]
    fn hard_breaks_render_br() {
        let soft = MarkdownParser::new().parse("one\ntwo");
        assert!(!soft.html.contains("<br />"));

        let hard = MarkdownParser::new().with_hard_breaks(true).parse("one\ntwo");
        assert!(hard.html.contains("<br />"));
    }

    #[test]
    fn raw_html_passes_through() {
        let parsed = MarkdownParser::new().parse("<div class=\"x\">hi</div>\n");
        assert!(parsed.html.contains("<div class=\"x\">hi</div>"));
    }

    #[test]
    fn modifiers_run_in_order_before_parsing() {
        let mut parser = MarkdownParser::new();
        parser.add_pre_input_modifier(|s| s.replace("{{name}}", "world"));
        parser.add_pre_input_modifier(|s| format!("# Hello {}", s.trim()));
        let parsed = parser.parse("{{name}}");
        assert_eq!(parsed.title.as_deref(), Some("Hello world"));
    }

    #[test]
    fn html_discards_metadata() {
        let html = MarkdownParser::new().html("---\na: b\n---\n*x*");
        assert_eq!(html.trim(), "<p><em>x</em></p>");
    }
}
