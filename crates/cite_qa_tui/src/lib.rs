//! Terminal chat interface for cited Q&A.
//! Renders the conversation held by `cite_qa_client::Conversation` and drives
//! the HTTP query client from a single event loop.

pub mod app;
pub mod events;
pub mod rendering;
pub mod terminal;

use anyhow::Result;
use cite_qa_client::Client;

pub use app::App;
use terminal::TerminalManager;

/// Take over the terminal and run the chat until the user quits.
pub async fn run(client: Client) -> Result<()> {
    let mut manager = TerminalManager::new()?;
    let mut app = App::new(client);

    let res = app.run(manager.terminal_mut()).await;

    // Abort any request still in flight before handing the terminal back.
    drop(app);
    manager.restore()?;
    res
}
