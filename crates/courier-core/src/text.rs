//! Text rewriting helpers.
//!
//! A [`Replacer`] runs a fixed sequence of rewrite steps over a string.
//! [`escape_html`] uses one to flatten an HTML fragment into plain text,
//! e.g. before echoing user-supplied markup into a message sent without a
//! parse mode.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// One rewrite step.
pub trait TextReplacer: Send + Sync {
    fn execute(&self, value: &str) -> String;
}

struct StringReplacer {
    from: String,
    to: String,
}

impl TextReplacer for StringReplacer {
    fn execute(&self, value: &str) -> String {
        value.replace(&self.from, &self.to)
    }
}

/// Replaces every match. `$1`/`${name}` in the replacement expand to groups.
struct RegexReplacer {
    regex: Regex,
    replacement: String,
}

impl TextReplacer for RegexReplacer {
    fn execute(&self, value: &str) -> String {
        self.regex
            .replace_all(value, self.replacement.as_str())
            .into_owned()
    }
}

struct FnReplacer<F>(F);

impl<F> TextReplacer for FnReplacer<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn execute(&self, value: &str) -> String {
        (self.0)(value)
    }
}

/// An ordered chain of rewrite steps.
///
/// ```rust
/// use courier_core::text::Replacer;
/// use regex::Regex;
///
/// let mut replacer = Replacer::new();
/// replacer
///     .add_string("colour", "color")
///     .add_regex(Regex::new(r"(\d+)px").unwrap(), "${1} pixels")
///     .add_fn(|s| s.to_uppercase());
///
/// assert_eq!(replacer.execute("colour: 4px"), "COLOR: 4 PIXELS");
/// ```
#[derive(Default)]
pub struct Replacer {
    steps: Vec<Box<dyn TextReplacer>>,
}

impl Replacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a literal replace-all step.
    pub fn add_string(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.add(StringReplacer {
            from: from.into(),
            to: to.into(),
        })
    }

    /// Appends a regex replace-all step.
    pub fn add_regex(&mut self, regex: Regex, replacement: impl Into<String>) -> &mut Self {
        self.add(RegexReplacer {
            regex,
            replacement: replacement.into(),
        })
    }

    /// Appends an arbitrary function step.
    pub fn add_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.add(FnReplacer(f))
    }

    /// Appends any step, including another `Replacer`.
    pub fn add(&mut self, step: impl TextReplacer + 'static) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in insertion order.
    pub fn execute(&self, value: &str) -> String {
        self.steps
            .iter()
            .fold(value.to_owned(), |acc, step| step.execute(&acc))
    }
}

impl TextReplacer for Replacer {
    fn execute(&self, value: &str) -> String {
        Replacer::execute(self, value)
    }
}

impl fmt::Debug for Replacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replacer")
            .field("steps", &self.steps.len())
            .finish()
    }
}

static HTML_REPLACER: LazyLock<Replacer> = LazyLock::new(html_replacer);

/// Builds the replacer behind [`escape_html`].
///
/// Decodes the common entities, turns `<br>`/`<hr>` into line breaks,
/// drops every other tag, collapses blank runs and trims each line.
pub fn html_replacer() -> Replacer {
    let mut replacer = Replacer::new();
    replacer
        .add_string("&nbsp;", " ")
        .add_string("&lt;", "<")
        .add_string("&gt;", ">")
        .add_string("&quot;", "\"")
        .add_string("&apos;", "'")
        .add_string("&amp;", "&")
        .add_string("&#039;", "'")
        .add_string("<br>", "\n")
        .add_string("<hr>", "\n")
        .add_regex(static_regex(r"<[^<>]+>"), " ")
        .add_regex(static_regex(r"[\t ]+"), " ")
        .add_regex(static_regex(r"(?m)^\s+|\s+$"), "")
        .add_fn(|s| s.trim().to_owned());
    replacer
}

/// Flattens an HTML fragment into plain text.
///
/// Entities are decoded before tags are stripped, so `&lt;b&gt;` is
/// removed like a real `<b>`.
pub fn escape_html(value: &str) -> String {
    HTML_REPLACER.execute(value)
}

fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern is a valid regex")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_run_in_order() {
        let mut replacer = Replacer::new();
        replacer.add_string("a", "b").add_string("b", "c");
        assert_eq!(replacer.execute("ab"), "cc");

        let mut reversed = Replacer::new();
        reversed.add_string("b", "c").add_string("a", "b");
        assert_eq!(reversed.execute("ab"), "bc");
    }

    #[test]
    fn test_regex_step_expands_groups() {
        let mut replacer = Replacer::new();
        replacer.add_regex(Regex::new(r"(\w+)@(\w+)").unwrap(), "$2:$1");
        assert_eq!(replacer.execute("alice@home bob@work"), "home:alice work:bob");
    }

    #[test]
    fn test_nested_replacer_and_fn() {
        let mut inner = Replacer::new();
        inner.add_string("-", "_");

        let mut outer = Replacer::new();
        outer.add(inner).add_fn(|s| s.to_uppercase());

        assert_eq!(outer.len(), 2);
        assert_eq!(outer.execute("snake-case"), "SNAKE_CASE");
        assert_eq!(Replacer::new().execute("same"), "same");
    }

    #[test]
    fn test_escape_html_decodes_entities() {
        assert_eq!(
            escape_html("Tom &amp; Jerry &quot;cartoon&quot; &#039;99"),
            "Tom & Jerry \"cartoon\" '99"
        );
        assert_eq!(escape_html("1 &lt; 2"), "1 < 2");
    }

    #[test]
    fn test_escape_html_strips_tags() {
        assert_eq!(escape_html("<b>bold</b> and <i>italic</i>"), "bold and italic");
        assert_eq!(escape_html("&lt;b&gt;bold&lt;/b&gt;"), "bold");
        assert_eq!(escape_html("<p>Hello</p><br><p>World</p>"), "Hello\nWorld");
        assert_eq!(escape_html("top<hr>bottom"), "top\nbottom");
    }

    #[test]
    fn test_escape_html_collapses_whitespace() {
        assert_eq!(escape_html("a&nbsp;&nbsp;b"), "a b");
        assert_eq!(escape_html("a\t\t  b"), "a b");
    }

    #[test]
    fn test_escape_html_trims_lines() {
        assert_eq!(escape_html("  first  \n   second\t\n"), "first\nsecond");
        assert_eq!(escape_html("   "), "");
    }
}
