//! In-memory message list for the chat view.
//!
//! Exchanges are appended optimistically: the user text goes in together
//! with a pending reply slot, and the slot is resolved or failed in place
//! once the request settles. Nothing here is persisted; a reload starts
//! from an empty transcript.

/// Handle to one exchange in a [`Transcript`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeId(usize);

/// State of the reply slot of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyState {
    Pending,
    Fulfilled(String),
    Errored(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user_text: String,
    pub reply: ReplyState,
}

#[derive(Debug, Default)]
pub struct Transcript {
    exchanges: Vec<Exchange>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new exchange with a pending reply and returns its handle.
    pub fn append_pending(&mut self, user_text: &str) -> ExchangeId {
        self.exchanges.push(Exchange {
            user_text: sanitize(user_text),
            reply: ReplyState::Pending,
        });
        ExchangeId(self.exchanges.len() - 1)
    }

    /// Replaces the pending slot with the final reply text.
    ///
    /// The text is taken literally; it is sanitized for terminal output but
    /// never interpreted as markup.
    pub fn resolve(&mut self, id: ExchangeId, final_text: &str) {
        if let Some(exchange) = self.exchanges.get_mut(id.0) {
            exchange.reply = ReplyState::Fulfilled(sanitize(final_text));
        }
    }

    /// Replaces the pending slot with an error indication.
    pub fn fail(&mut self, id: ExchangeId, message: &str) {
        if let Some(exchange) = self.exchanges.get_mut(id.0) {
            exchange.reply = ReplyState::Errored(sanitize(message));
        }
    }

    pub fn get(&self, id: ExchangeId) -> Option<&Exchange> {
        self.exchanges.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Drops every exchange. Used by the reload success policy.
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}

/// Strips control characters (except `\n` and `\t`) so server- or
/// user-supplied text cannot smuggle terminal escape sequences into the
/// rendered transcript.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_resolve() {
        let mut transcript = Transcript::new();
        let id = transcript.append_pending("Hello");

        let exchange = transcript.get(id).unwrap();
        assert_eq!(exchange.user_text, "Hello");
        assert_eq!(exchange.reply, ReplyState::Pending);

        transcript.resolve(id, "Hi there");
        let exchange = transcript.get(id).unwrap();
        assert_eq!(exchange.reply, ReplyState::Fulfilled("Hi there".to_string()));
    }

    #[test]
    fn append_then_fail() {
        let mut transcript = Transcript::new();
        let id = transcript.append_pending("Hello");

        transcript.fail(id, "server returned 500");
        assert_eq!(
            transcript.get(id).unwrap().reply,
            ReplyState::Errored("server returned 500".to_string())
        );
    }

    #[test]
    fn reply_text_is_literal() {
        let mut transcript = Transcript::new();
        let id = transcript.append_pending("q");

        transcript.resolve(id, "<b>bold</b> & \"quoted\"");
        assert_eq!(
            transcript.get(id).unwrap().reply,
            ReplyState::Fulfilled("<b>bold</b> & \"quoted\"".to_string())
        );
    }

    #[test]
    fn handles_stay_valid_across_appends() {
        let mut transcript = Transcript::new();
        let first = transcript.append_pending("one");
        let second = transcript.append_pending("two");

        transcript.resolve(first, "1");
        transcript.resolve(second, "2");

        assert_eq!(transcript.get(first).unwrap().reply, ReplyState::Fulfilled("1".into()));
        assert_eq!(transcript.get(second).unwrap().reply, ReplyState::Fulfilled("2".into()));
    }

    #[test]
    fn sanitize_strips_escape_sequences() {
        assert_eq!(sanitize("plain"), "plain");
        assert_eq!(sanitize("a\x1b[31mred\x1b[0mb"), "a[31mred[0mb");
        assert_eq!(sanitize("line\nbreak\tand\rret"), "line\nbreak\tandret");
    }

    #[test]
    fn clear_empties_the_list() {
        let mut transcript = Transcript::new();
        transcript.append_pending("one");
        transcript.append_pending("two");
        assert_eq!(transcript.len(), 2);

        transcript.clear();
        assert!(transcript.is_empty());
    }
}
