//! Conversation state shared by the front-ends: the query input, the loading
//! flag, the error banner and the append-only transcript.
//!
//! A submission is two disjoint mutations. [`Conversation::begin_submit`]
//! appends the user message and marks the request in flight;
//! [`Conversation::finish_submit`] applies the outcome. Front-ends that keep
//! rendering while the request runs call the two halves around their own task;
//! [`Conversation::submit`] runs both in sequence.

use crate::client::{Client, ClientError};
use crate::messages::{QueryCitation, QueryOutput};

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    /// Always empty for user messages.
    pub citations: Vec<QueryCitation>,
    pub is_user: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
            is_user: true,
        }
    }

    pub fn assistant(output: QueryOutput) -> Self {
        Self {
            text: output.response,
            citations: output.citations,
            is_user: false,
        }
    }
}

/// Ordered, append-only list of messages.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Message> {
        self.messages.get(idx)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Where keyboard input goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Citations,
}

/// Coarse view state derived from the loading flag and the error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Submitting,
    DisplayingError,
}

/// A submission accepted by [`Conversation::begin_submit`]; the text to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub query: String,
}

/// Owned state for one chat session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    query: String,
    loading: bool,
    error: Option<String>,
    transcript: Transcript,
    focus: Focus,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    pub fn state(&self) -> ViewState {
        if self.loading {
            ViewState::Submitting
        } else if self.error.is_some() {
            ViewState::DisplayingError
        } else {
            ViewState::Idle
        }
    }

    /// True when the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.query.trim().is_empty()
    }

    /// Start a submission: append the user message, clear the error, set loading.
    ///
    /// Returns `None` (and changes nothing) for a blank query or while another
    /// request is in flight.
    pub fn begin_submit(&mut self) -> Option<PendingQuery> {
        if !self.can_submit() {
            if self.loading {
                tracing::debug!("submission ignored: request already in flight");
            }
            return None;
        }
        let query = self.query.clone();
        self.transcript.push(Message::user(query.clone()));
        self.error = None;
        self.loading = true;
        Some(PendingQuery { query })
    }

    /// Apply the outcome of the in-flight request.
    ///
    /// The input is cleared and focused whatever the outcome. Calling this with
    /// no request in flight is ignored.
    pub fn finish_submit(&mut self, result: Result<QueryOutput, ClientError>) {
        if !self.loading {
            tracing::debug!("reply ignored: no request in flight");
            return;
        }
        match result {
            Ok(output) => {
                self.transcript.push(Message::assistant(output));
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "query failed");
                self.error = Some(err.user_message());
            }
        }
        self.loading = false;
        self.query.clear();
        self.focus = Focus::Input;
    }

    /// Run a whole submission against `client`. Returns whether one happened.
    pub async fn submit(&mut self, client: &Client) -> bool {
        let Some(pending) = self.begin_submit() else {
            return false;
        };
        let result = client.ask(&pending.query).await;
        self.finish_submit(result);
        true
    }
}
