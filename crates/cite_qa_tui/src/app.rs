//! Chat application state and event loop.
//!
//! The `App` owns the [`Conversation`] and drives the query client. A submit
//! appends the user message synchronously, then runs the request on a spawned
//! task whose outcome comes back over a channel, so the loop keeps redrawing
//! (spinner, typing) while the backend works. Dropping the `App` aborts any
//! request still in flight.

use std::time::Duration;

use anyhow::Result;
use cite_qa_client::{Client, ClientError, Conversation, Focus, QueryOutput};
use crossterm::event::{Event, EventStream};
use futures_util::stream::{Stream, StreamExt};
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::{key_to_action, Action};
use crate::rendering::{render_ui, CitationRef, RenderState};

const SPINNER_TICK: Duration = Duration::from_millis(120);
const SCROLL_STEP: u16 = 5;

type Reply = Result<QueryOutput, ClientError>;

pub struct App {
    conversation: Conversation,
    client: Client,
    selected: Option<CitationRef>,
    scroll_back: u16,
    spinner_frame: usize,
    should_quit: bool,
    in_flight: Option<JoinHandle<()>>,
    reply_tx: mpsc::UnboundedSender<Reply>,
    reply_rx: mpsc::UnboundedReceiver<Reply>,
}

impl App {
    pub fn new(client: Client) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            conversation: Conversation::new(),
            client,
            selected: None,
            scroll_back: 0,
            spinner_frame: 0,
            should_quit: false,
            in_flight: None,
            reply_tx,
            reply_rx,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn selected(&self) -> Option<CitationRef> {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run against the real terminal event stream.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.run_with(terminal, EventStream::new()).await
    }

    /// Run until quit or until `events` ends.
    pub async fn run_with<B, S>(&mut self, terminal: &mut Terminal<B>, events: S) -> Result<()>
    where
        B: Backend,
        S: Stream<Item = std::io::Result<Event>> + Unpin,
    {
        let mut events = events;
        let mut tick = tokio::time::interval(SPINNER_TICK);

        while !self.should_quit {
            terminal.draw(|f| render_ui(f, &self.render_state()))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_action(key_to_action(key)),
                    // Resize and the rest only need a redraw.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => self.should_quit = true,
                },
                Some(reply) = self.reply_rx.recv() => self.apply_reply(reply),
                _ = tick.tick() => {
                    if self.conversation.loading() {
                        self.spinner_frame = self.spinner_frame.wrapping_add(1);
                    }
                }
            }
        }

        Ok(())
    }

    fn render_state(&self) -> RenderState<'_> {
        RenderState {
            conversation: &self.conversation,
            selected: self.selected,
            spinner_frame: self.spinner_frame,
            scroll_back: self.scroll_back,
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Submit => {
                if self.conversation.focus() == Focus::Input {
                    self.submit();
                }
            }
            Action::InsertChar(c) => {
                self.conversation.set_focus(Focus::Input);
                self.conversation.push_char(c);
            }
            Action::DeleteChar => {
                self.conversation.set_focus(Focus::Input);
                self.conversation.pop_char();
            }
            Action::ToggleFocus => match self.conversation.focus() {
                Focus::Input => self.focus_citations(),
                Focus::Citations => self.conversation.set_focus(Focus::Input),
            },
            Action::FocusInput => self.conversation.set_focus(Focus::Input),
            Action::PrevCitation => self.move_selection(-1),
            Action::NextCitation => self.move_selection(1),
            Action::ScrollUp => self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP),
            Action::ScrollDown => self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP),
            Action::None => {}
        }
    }

    /// Start a submission; the reply is applied when it arrives.
    fn submit(&mut self) {
        let Some(pending) = self.conversation.begin_submit() else {
            return;
        };
        self.scroll_back = 0;
        let client = self.client.clone();
        let tx = self.reply_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let reply = client.ask(&pending.query).await;
            // Receiver gone means the view was torn down.
            let _ = tx.send(reply);
        }));
    }

    fn apply_reply(&mut self, reply: Reply) {
        self.in_flight = None;
        self.conversation.finish_submit(reply);
        self.selected = None;
        self.scroll_back = 0;
    }

    /// Wait for the in-flight request, if any, and apply its outcome.
    pub async fn settle(&mut self) {
        if self.in_flight.is_none() {
            return;
        }
        if let Some(reply) = self.reply_rx.recv().await {
            self.apply_reply(reply);
        }
    }

    /// Every citation marker in transcript order.
    fn citation_refs(&self) -> Vec<CitationRef> {
        self.conversation
            .transcript()
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_user)
            .flat_map(|(message, m)| {
                (0..m.citations.len()).map(move |citation| CitationRef { message, citation })
            })
            .collect()
    }

    /// Enter citation focus on the first marker of the newest answer that has any.
    fn focus_citations(&mut self) {
        let refs = self.citation_refs();
        let Some(last) = refs.last() else {
            return;
        };
        let start = refs
            .iter()
            .find(|r| r.message == last.message)
            .copied()
            .unwrap_or(*last);
        self.selected = Some(start);
        self.conversation.set_focus(Focus::Citations);
    }

    fn move_selection(&mut self, delta: isize) {
        if self.conversation.focus() != Focus::Citations {
            return;
        }
        let refs = self.citation_refs();
        let Some(current) = self
            .selected
            .and_then(|sel| refs.iter().position(|r| *r == sel))
        else {
            return;
        };
        let next = current
            .saturating_add_signed(delta)
            .min(refs.len().saturating_sub(1));
        self.selected = Some(refs[next]);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
