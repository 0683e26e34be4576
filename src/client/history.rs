//! Persistent conversation history.
//!
//! `History` is a copy-on-append sequence of [`Message`]s: `push` returns a
//! new value and leaves the receiver untouched. Messages are `Arc`-shared,
//! so branching many continuations off one prefix copies pointers, not
//! message bodies, and no continuation can observe another's appends.

use std::sync::Arc;

use super::types::Message;

/// Ordered record of prior conversation turns.
///
/// Insertion order is chronological. The sequence is never mutated in
/// place — every append produces a new `History`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    messages: Vec<Arc<Message>>,
}

impl History {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Return a new history with `message` appended. `self` is unchanged.
    #[must_use]
    pub fn push(&self, message: Message) -> Self {
        let mut messages = self.messages.clone();
        messages.push(Arc::new(message));
        Self { messages }
    }

    /// Messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().map(|m| m.as_ref())
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index).map(|m| m.as_ref())
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last().map(|m| m.as_ref())
    }

    /// Materialize an owned message list (request-body assembly).
    pub(crate) fn to_messages(&self) -> Vec<Message> {
        self.iter().cloned().collect()
    }
}

impl FromIterator<Message> for History {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::Role;

    #[test]
    fn test_push_leaves_original_untouched() {
        let base = History::new().push(Message::user("hello"));
        let extended = base.push(Message::assistant("hi"));

        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(base.last().unwrap().content, "hello");
        assert_eq!(extended.last().unwrap().content, "hi");
    }

    #[test]
    fn test_branches_share_prefix_but_diverge() {
        let prefix = History::new()
            .push(Message::user("question"))
            .push(Message::assistant("answer"));

        let branch_a = prefix.push(Message::user("follow-up a"));
        let branch_b = prefix.push(Message::user("follow-up b"));

        assert_eq!(branch_a.get(0), branch_b.get(0));
        assert_eq!(branch_a.get(1), branch_b.get(1));
        assert_ne!(branch_a.last(), branch_b.last());
        assert_eq!(prefix.len(), 2);
    }

    #[test]
    fn test_iteration_order_is_insertion_order() {
        let history: History = vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ]
        .into_iter()
        .collect();

        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(history.get(1).unwrap().role, Role::Assistant);
    }

    #[test]
    fn test_to_messages_round_trips() {
        let history = History::new().push(Message::user("hello"));
        let messages = history.to_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], Message::user("hello"));
    }
}
