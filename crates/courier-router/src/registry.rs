//! Command registries.
//!
//! A [`CommandList`] ranks text patterns against the dispatch text of one
//! channel and returns the chain of the best-scoring registration. A
//! [`CustomCommandList`] classifies whole updates with predicates instead.

use std::fmt;

use courier_core::{Matcher, PatternError, Update};
use tracing::trace;

use crate::handler::{Handler, UpdatePredicate};

/// The outcome of a successful [`CommandList::find_handler`] lookup.
#[derive(Clone, Copy)]
pub struct Resolved<'a> {
    /// Handlers registered for the winning pattern.
    pub handlers: &'a [Handler],
    /// The winning pattern, as registered.
    pub pattern: &'a str,
    /// The score the pattern achieved.
    pub score: usize,
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("handlers", &self.handlers.len())
            .field("pattern", &self.pattern)
            .field("score", &self.score)
            .finish()
    }
}

struct Command {
    matcher: Matcher,
    handlers: Vec<Handler>,
}

/// Pattern-scored bindings for one channel, in registration order.
#[derive(Default)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `pattern` and appends a binding.
    pub fn add_handler(
        &mut self,
        pattern: &str,
        handlers: impl IntoIterator<Item = Handler>,
    ) -> Result<(), PatternError> {
        let matcher = Matcher::compile(pattern)?;
        self.commands.push(Command {
            matcher,
            handlers: handlers.into_iter().collect(),
        });
        Ok(())
    }

    /// Returns the binding with the highest score for `text`.
    ///
    /// On equal scores the earliest registration wins. A score of zero is a
    /// match; `None` means no pattern matched at all.
    pub fn find_handler(&self, text: &str) -> Option<Resolved<'_>> {
        let mut best: Option<Resolved<'_>> = None;

        for command in &self.commands {
            let Some(score) = command.matcher.score(text) else {
                continue;
            };

            trace!(pattern = command.matcher.pattern().as_str(), score, "Pattern matched");

            if best.is_none_or(|b| score > b.score) {
                best = Some(Resolved {
                    handlers: &command.handlers,
                    pattern: command.matcher.pattern().as_str(),
                    score,
                });
            }
        }

        best
    }

    /// Registered patterns, in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.matcher.pattern().as_str())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}

struct CustomCommand {
    predicate: UpdatePredicate,
    handlers: Vec<Handler>,
}

/// Predicate-matched bindings. The first predicate returning `true` wins.
#[derive(Default)]
pub struct CustomCommandList {
    commands: Vec<CustomCommand>,
}

impl CustomCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_handler<P>(&mut self, predicate: P, handlers: impl IntoIterator<Item = Handler>)
    where
        P: Fn(&Update) -> bool + Send + Sync + 'static,
    {
        self.commands.push(CustomCommand {
            predicate: Box::new(predicate),
            handlers: handlers.into_iter().collect(),
        });
    }

    pub fn find_handler(&self, update: &Update) -> Option<&[Handler]> {
        self.commands
            .iter()
            .find(|command| (command.predicate)(update))
            .map(|command| command.handlers.as_slice())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CustomCommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCommandList")
            .field("len", &self.commands.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::handler::handler;

    fn tagged(tag: &'static str) -> Vec<Handler> {
        vec![handler(move |ctx| ctx.error(crate::DispatchError::custom(tag)))]
    }

    fn same(a: &[Handler], b: &[Handler]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
    }

    #[test]
    fn test_empty_list_finds_nothing() {
        let list = CommandList::new();
        assert!(list.find_handler("/start").is_none());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let mut list = CommandList::new();
        let err = list.add_handler("/a$b$", tagged("x")).unwrap_err();
        assert_eq!(err, PatternError::MultipleAnchors("/a$b$".into()));
        assert!(list.is_empty());
    }

    #[test]
    fn test_most_specific_pattern_wins() {
        let root = tagged("root");
        let exact = tagged("exact");

        let mut list = CommandList::new();
        list.add_handler("/", root.clone()).unwrap();
        list.add_handler("/a/b", exact.clone()).unwrap();

        let found = list.find_handler("/a/b").unwrap();
        assert_eq!(found.pattern, "/a/b");
        assert_eq!(found.score, 4);
        assert!(same(found.handlers, &exact));

        let found = list.find_handler("/x").unwrap();
        assert_eq!(found.pattern, "/");
        assert!(same(found.handlers, &root));
    }

    #[test]
    fn test_tie_goes_to_first_registration() {
        let first = tagged("first");
        let second = tagged("second");

        let mut list = CommandList::new();
        list.add_handler("/a*", first.clone()).unwrap();
        list.add_handler("/a*$", second.clone()).unwrap();

        let found = list.find_handler("/abc").unwrap();
        assert_eq!(found.score, 4);
        assert_eq!(found.pattern, "/a*");
        assert!(same(found.handlers, &first));
    }

    #[test]
    fn test_zero_score_is_found() {
        let mut list = CommandList::new();
        list.add_handler("*", tagged("any")).unwrap();

        let found = list.find_handler("").unwrap();
        assert_eq!(found.score, 0);
        assert_eq!(found.pattern, "*");
    }

    #[test]
    fn test_no_match() {
        let mut list = CommandList::new();
        list.add_handler("/start", tagged("start")).unwrap();
        assert!(list.find_handler("/stop").is_none());
        assert_eq!(list.patterns().collect::<Vec<_>>(), ["/start"]);
    }

    #[test]
    fn test_custom_first_predicate_wins() {
        let members = tagged("members");
        let catch_all = tagged("all");

        let mut list = CustomCommandList::new();
        list.add_handler(|u: &Update| u.has_other("chat_member"), members.clone());
        list.add_handler(|_: &Update| true, catch_all.clone());

        let mut update = Update::default();
        update
            .other
            .insert("chat_member".into(), serde_json::json!({}));
        assert!(same(list.find_handler(&update).unwrap(), &members));
        assert!(same(list.find_handler(&Update::default()).unwrap(), &catch_all));
    }

    #[test]
    fn test_custom_no_match() {
        let mut list = CustomCommandList::new();
        list.add_handler(|_: &Update| false, tagged("never"));
        assert!(list.find_handler(&Update::default()).is_none());
    }
}
