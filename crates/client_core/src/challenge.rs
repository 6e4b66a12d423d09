//! Ordered queue of pending challenge questions.
//!
//! Questions live in an arena with a moving head index. Every refill or
//! clear starts a new round, so a [`QueueTicket`] taken before a remote call
//! can tell whether the head it was issued for is still the head.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("challenge queue is empty")]
    EmptyQueue,
}

/// Identifies one head position of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueTicket {
    round: u64,
    position: usize,
    question: String,
}

impl QueueTicket {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn round(&self) -> u64 {
        self.round
    }
}

#[derive(Debug, Default)]
pub struct ChallengeQueue {
    questions: Vec<String>,
    head: usize,
    round: u64,
}

impl ChallengeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever is pending with `questions`, in the given order.
    pub fn enqueue_all<I>(&mut self, questions: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.questions = questions.into_iter().collect();
        self.head = 0;
        self.round += 1;
    }

    pub fn peek_first(&self) -> Option<&str> {
        self.questions.get(self.head).map(String::as_str)
    }

    pub fn dequeue_first(&mut self) -> Result<String, QueueError> {
        let question = self
            .questions
            .get_mut(self.head)
            .map(std::mem::take)
            .ok_or(QueueError::EmptyQueue)?;
        self.head += 1;
        if self.head == self.questions.len() {
            self.questions.clear();
            self.head = 0;
        }
        Ok(question)
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.len();
        self.questions.clear();
        self.head = 0;
        self.round += 1;
        dropped
    }

    pub fn len(&self) -> usize {
        self.questions.len() - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Remaining questions, head first.
    pub fn pending(&self) -> &[String] {
        &self.questions[self.head..]
    }

    pub fn head_ticket(&self) -> Option<QueueTicket> {
        self.peek_first().map(|question| QueueTicket {
            round: self.round,
            position: self.head,
            question: question.to_string(),
        })
    }

    pub fn is_head(&self, ticket: &QueueTicket) -> bool {
        ticket.round == self.round
            && ticket.position == self.head
            && self.peek_first() == Some(ticket.question.as_str())
    }

    /// Pops the head only if `ticket` still names it.
    pub fn dequeue_if_head(&mut self, ticket: &QueueTicket) -> bool {
        if !self.is_head(ticket) {
            return false;
        }
        self.dequeue_first().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(questions: &[&str]) -> ChallengeQueue {
        let mut queue = ChallengeQueue::new();
        queue.enqueue_all(questions.iter().map(|q| q.to_string()));
        queue
    }

    #[test]
    fn drains_in_fetch_order() {
        let mut queue = queue_of(&["one", "two", "three"]);
        assert_eq!(queue.peek_first(), Some("one"));
        assert_eq!(queue.dequeue_first().expect("one"), "one");
        assert_eq!(queue.dequeue_first().expect("two"), "two");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue_first().expect("three"), "three");
        assert!(queue.is_empty());
        assert_eq!(queue.peek_first(), None);
    }

    #[test]
    fn dequeue_on_empty_queue_fails() {
        let mut queue = ChallengeQueue::new();
        assert_eq!(queue.dequeue_first(), Err(QueueError::EmptyQueue));
    }

    #[test]
    fn enqueue_all_replaces_stale_questions() {
        let mut queue = queue_of(&["old-1", "old-2"]);
        queue.dequeue_first().expect("dequeue");
        queue.enqueue_all(vec!["new".to_string()]);
        assert_eq!(queue.pending(), ["new".to_string()]);
    }

    #[test]
    fn peek_does_not_mutate() {
        let queue = queue_of(&["only"]);
        assert_eq!(queue.peek_first(), Some("only"));
        assert_eq!(queue.peek_first(), Some("only"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn ticket_goes_stale_after_clear() {
        let mut queue = queue_of(&["q"]);
        let ticket = queue.head_ticket().expect("ticket");
        assert_eq!(queue.clear(), 1);
        assert!(!queue.dequeue_if_head(&ticket));
    }

    #[test]
    fn ticket_goes_stale_when_same_question_is_refetched() {
        let mut queue = queue_of(&["q"]);
        let ticket = queue.head_ticket().expect("ticket");
        queue.enqueue_all(vec!["q".to_string()]);
        assert!(!queue.dequeue_if_head(&ticket));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn ticket_goes_stale_once_head_is_consumed() {
        let mut queue = queue_of(&["same", "same"]);
        let ticket = queue.head_ticket().expect("ticket");
        assert!(queue.dequeue_if_head(&ticket));
        assert!(!queue.dequeue_if_head(&ticket));
        assert_eq!(queue.len(), 1);
    }
}
