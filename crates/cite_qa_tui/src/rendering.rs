//! Draws the conversation: transcript (with citation markers, loading
//! indicator and error banner), citation detail, query input, status bar.

use cite_qa_client::{Conversation, Focus, Message, QueryCitation};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const MUTED: Color = Color::Rgb(113, 113, 122);
const USER: Color = Color::Rgb(59, 130, 246);
const ASSISTANT: Color = Color::Rgb(16, 185, 129);
const ERROR: Color = Color::Rgb(239, 68, 68);

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const DETAIL_HEIGHT: u16 = 6;

/// Position of one citation marker: message index, citation index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationRef {
    pub message: usize,
    pub citation: usize,
}

/// Everything the renderer needs for one frame
pub struct RenderState<'a> {
    pub conversation: &'a Conversation,
    pub selected: Option<CitationRef>,
    pub spinner_frame: usize,
    /// Rows scrolled up from the bottom of the transcript
    pub scroll_back: u16,
}

impl RenderState<'_> {
    fn selected_citation(&self) -> Option<&QueryCitation> {
        if self.conversation.focus() != Focus::Citations {
            return None;
        }
        let r = self.selected?;
        self.conversation
            .transcript()
            .get(r.message)?
            .citations
            .get(r.citation)
    }
}

/// Vertical layout: transcript, optional citation detail, input, status bar
pub struct AppLayout {
    pub transcript_area: Rect,
    pub detail_area: Option<Rect>,
    pub input_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn new(area: Rect, show_detail: bool) -> Self {
        let detail = if show_detail { DETAIL_HEIGHT } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(detail),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        Self {
            transcript_area: chunks[0],
            detail_area: show_detail.then_some(chunks[1]),
            input_area: chunks[2],
            status_area: chunks[3],
        }
    }
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let citation = state.selected_citation();
    let layout = AppLayout::new(frame.area(), citation.is_some());

    render_transcript(frame, layout.transcript_area, state);
    if let (Some(area), Some(citation)) = (layout.detail_area, citation) {
        render_citation_detail(frame, area, citation);
    }
    render_input(frame, layout.input_area, state.conversation);
    render_status_bar(frame, layout.status_area, state.conversation);
}

fn author_line(is_user: bool) -> Line<'static> {
    let (label, color) = if is_user {
        ("user", USER)
    } else {
        ("assistant", ASSISTANT)
    };
    Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// One `[number]` span per citation; the selected one is highlighted.
pub fn citation_markers(message: &Message, selected: Option<usize>) -> Vec<Span<'static>> {
    if message.is_user {
        return Vec::new();
    }
    let mut spans = Vec::with_capacity(message.citations.len() * 2);
    for (idx, citation) in message.citations.iter().enumerate() {
        let style = if selected == Some(idx) {
            Style::default().fg(Color::Black).bg(USER)
        } else {
            Style::default().fg(USER)
        };
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!("[{}]", citation.number), style));
    }
    spans
}

/// Transcript as styled lines, including the loading line and error banner.
pub fn transcript_lines(state: &RenderState) -> Vec<Line<'static>> {
    let conversation = state.conversation;
    let highlight = state
        .selected
        .filter(|_| conversation.focus() == Focus::Citations);
    let mut lines = Vec::new();

    for (idx, message) in conversation.transcript().iter().enumerate() {
        lines.push(author_line(message.is_user));
        if message.text.is_empty() {
            lines.push(Line::default());
        }
        for text in message.text.lines() {
            lines.push(Line::from(text.to_string()));
        }
        let selected = highlight
            .filter(|r| r.message == idx)
            .map(|r| r.citation);
        let markers = citation_markers(message, selected);
        if !markers.is_empty() {
            lines.push(Line::from(markers));
        }
        lines.push(Line::default());
    }

    if conversation.loading() {
        lines.push(author_line(false));
        let frame = SPINNER[state.spinner_frame % SPINNER.len()];
        lines.push(Line::from(Span::styled(
            format!("{} thinking...", frame),
            Style::default().fg(MUTED),
        )));
        lines.push(Line::default());
    }

    if let Some(error) = conversation.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
        )));
    }

    lines
}

fn render_transcript(frame: &mut Frame, area: Rect, state: &RenderState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(" Conversation ");
    let inner = block.inner(area);
    let paragraph = Paragraph::new(Text::from(transcript_lines(state))).wrap(Wrap { trim: false });

    // Follow the bottom unless scrolled back. Counted before the block is
    // attached so borders are not included.
    let total = u16::try_from(paragraph.line_count(inner.width)).unwrap_or(u16::MAX);
    let offset = total
        .saturating_sub(inner.height)
        .saturating_sub(state.scroll_back);

    frame.render_widget(paragraph.block(block).scroll((offset, 0)), area);
}

fn render_citation_detail(frame: &mut Frame, area: Rect, citation: &QueryCitation) {
    let paragraph = Paragraph::new(citation.text.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(USER))
                .title(format!(" Citation {} ", citation.number)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, area: Rect, conversation: &Conversation) {
    let focused = conversation.focus() == Focus::Input;
    let submit_style = if conversation.can_submit() {
        Style::default().fg(ASSISTANT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(MUTED).add_modifier(Modifier::DIM)
    };
    let border = if focused { USER } else { MUTED };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title_top(Line::from(Span::styled(" Submit ", submit_style)))
        .title_top(Line::from(" Enter your query ").right_aligned());
    let inner = block.inner(area);

    // Keep the tail of long queries visible.
    let query = conversation.query();
    let visible: String = {
        let count = query.chars().count();
        let room = usize::from(inner.width.saturating_sub(1));
        query.chars().skip(count.saturating_sub(room)).collect()
    };
    let cursor_x = inner.x + u16::try_from(visible.chars().count()).unwrap_or(0);

    frame.render_widget(Paragraph::new(visible).block(block), area);
    if focused {
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, conversation: &Conversation) {
    let text = if conversation.loading() {
        " Waiting for answer... | Ctrl+C: quit ".to_string()
    } else {
        match conversation.focus() {
            Focus::Input => {
                " Enter: submit | Tab: citations | PgUp/PgDn: scroll | Ctrl+C: quit ".to_string()
            }
            Focus::Citations => {
                " Left/Right: select citation | Esc/Tab: back to input | Ctrl+C: quit "
                    .to_string()
            }
        }
    };
    let bar = Paragraph::new(text)
        .style(Style::default().fg(Color::Rgb(250, 250, 250)).bg(Color::Rgb(24, 24, 27)));
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use cite_qa_client::{ClientError, QueryOutput};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;

    fn answered(conversation: &mut Conversation, question: &str, numbers: &[&str]) {
        conversation.set_query(question);
        conversation.begin_submit().unwrap();
        conversation.finish_submit(Ok(QueryOutput {
            query: question.into(),
            response: format!("Answer to {}", question),
            citations: numbers
                .iter()
                .map(|n| QueryCitation {
                    number: n.to_string(),
                    text: format!("Text of law {}", n),
                })
                .collect(),
        }));
    }

    fn state(conversation: &Conversation) -> RenderState<'_> {
        RenderState {
            conversation,
            selected: None,
            spinner_frame: 0,
            scroll_back: 0,
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn count_markers(lines: &[Line]) -> usize {
        lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .filter(|s| s.content.starts_with('['))
            .count()
    }

    #[test]
    fn test_markers_only_for_assistant_messages() {
        let user = Message::user("[1] looks like a marker but is typed text");
        assert!(citation_markers(&user, None).is_empty());

        let mut conversation = Conversation::new();
        answered(&mut conversation, "q", &["1.1", "2", "3.4.1"]);
        let reply = conversation.transcript().last().unwrap();
        let markers = citation_markers(reply, None);
        let labels: Vec<&str> = markers
            .iter()
            .map(|s| s.content.as_ref())
            .filter(|c| *c != " ")
            .collect();
        assert_eq!(labels, ["[1.1]", "[2]", "[3.4.1]"]);
    }

    #[test]
    fn test_marker_count_matches_citations() {
        let mut conversation = Conversation::new();
        answered(&mut conversation, "first", &["1", "2"]);
        answered(&mut conversation, "second", &[]);
        answered(&mut conversation, "third", &["7"]);

        let lines = transcript_lines(&state(&conversation));
        assert_eq!(count_markers(&lines), 3);
    }

    #[test]
    fn test_loading_line_and_error_banner() {
        let mut conversation = Conversation::new();
        conversation.set_query("q");
        conversation.begin_submit().unwrap();
        let text: Vec<String> = transcript_lines(&state(&conversation))
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert!(text.iter().any(|l| l.contains("thinking...")));

        conversation.finish_submit(Err(ClientError::UnexpectedResponse {
            status: 404,
            status_text: "Not Found".into(),
        }));
        let text: Vec<String> = transcript_lines(&state(&conversation))
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert!(!text.iter().any(|l| l.contains("thinking...")));
        assert_eq!(
            text.last().map(String::as_str),
            Some("Unexpected response: 404 Not Found")
        );
    }

    #[test]
    fn test_render_ui_shows_transcript_and_markers() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut conversation = Conversation::new();
        answered(&mut conversation, "What about widows?", &["4.1", "4.1.2"]);

        terminal
            .draw(|f| render_ui(f, &state(&conversation)))
            .unwrap();

        let screen = buffer_text(&terminal);
        assert!(screen.contains("What about widows?"));
        assert!(screen.contains("Answer to What about widows?"));
        assert!(screen.contains("[4.1] [4.1.2]"));
        assert!(screen.contains("Enter your query"));
        assert!(!screen.contains("Citation 4.1"));
    }

    #[test]
    fn test_selected_citation_reveals_text() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut conversation = Conversation::new();
        answered(&mut conversation, "q", &["4.1", "4.1.2"]);
        conversation.set_focus(Focus::Citations);
        let render_state = RenderState {
            selected: Some(CitationRef {
                message: 1,
                citation: 1,
            }),
            ..state(&conversation)
        };

        terminal.draw(|f| render_ui(f, &render_state)).unwrap();

        let screen = buffer_text(&terminal);
        assert!(screen.contains("Citation 4.1.2"));
        assert!(screen.contains("Text of law 4.1.2"));
    }

    #[test]
    fn test_transcript_follows_bottom() {
        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut conversation = Conversation::new();
        for i in 0..10 {
            answered(&mut conversation, &format!("question {}", i), &[]);
        }

        terminal
            .draw(|f| render_ui(f, &state(&conversation)))
            .unwrap();

        let screen = buffer_text(&terminal);
        assert!(screen.contains("Answer to question 9"));
        assert!(!screen.contains("question 0"));
    }

    #[test]
    fn test_word_wrapped_answer_keeps_error_banner_visible() {
        let backend = TestBackend::new(22, 16);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut conversation = Conversation::new();
        conversation.set_query("q");
        conversation.begin_submit().unwrap();
        conversation.finish_submit(Ok(QueryOutput {
            query: "q".into(),
            response: "abcdefg ".repeat(40).trim_end().to_string(),
            citations: Vec::new(),
        }));
        conversation.set_query("next");
        conversation.begin_submit().unwrap();
        conversation.finish_submit(Err(ClientError::UnexpectedResponse {
            status: 404,
            status_text: "Not Found".into(),
        }));

        terminal
            .draw(|f| render_ui(f, &state(&conversation)))
            .unwrap();

        // Two words per row at this width, so the answer takes more rows than
        // its character count suggests.
        let screen = buffer_text(&terminal);
        assert!(screen.contains("next"), "newest entry cut off:\n{}", screen);
        assert!(screen.contains("404 Not Found"), "banner cut off:\n{}", screen);
    }

    #[test]
    fn test_empty_answer_keeps_a_body_line() {
        let mut conversation = Conversation::new();
        conversation.set_query("q");
        conversation.begin_submit().unwrap();
        conversation.finish_submit(Ok(QueryOutput {
            query: "q".into(),
            response: String::new(),
            citations: Vec::new(),
        }));

        let text: Vec<String> = transcript_lines(&state(&conversation))
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(text, ["user", "q", "", "assistant", "", ""]);
    }

    #[test]
    fn test_submit_control_visible_when_narrow() {
        let backend = TestBackend::new(22, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let conversation = Conversation::new();

        terminal
            .draw(|f| render_ui(f, &state(&conversation)))
            .unwrap();

        assert!(buffer_text(&terminal).contains("Submit"));
    }

    #[test]
    fn test_layout_without_detail() {
        let layout = AppLayout::new(Rect::new(0, 0, 80, 24), false);
        assert!(layout.detail_area.is_none());
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.status_area.y, 23);
        assert_eq!(layout.input_area.height, 3);
        assert_eq!(layout.transcript_area.height, 20);

        let layout = AppLayout::new(Rect::new(0, 0, 80, 24), true);
        assert_eq!(layout.detail_area.map(|r| r.height), Some(DETAIL_HEIGHT));
        assert_eq!(layout.transcript_area.height, 20 - DETAIL_HEIGHT);
    }
}
