use std::{
    io::{self, Stdout},
    panic,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        is_raw_mode_enabled,
    },
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::{Line, Span},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use signal_hook::SigId;
use tracing::{debug, info, warn};

use crate::error::AppError;

use super::prompt::{Answer, Prompter};

enum PromptView<'a> {
    Choices {
        question: &'a str,
        choices: &'a [String],
        selected: usize,
    },
    Text {
        question: &'a str,
        buffer: &'a str,
    },
    Confirm {
        question: &'a str,
        default: bool,
    },
}

enum KeyAction {
    Key(KeyCode),
    Interrupt,
}

const INPUT_POLL: Duration = Duration::from_millis(200);

/// Full-screen prompts in the alternate screen. Raw mode turns Ctrl+C into a
/// key event, which every prompt reports as [`Answer::Interrupted`]. SIGTERM,
/// SIGINT and SIGHUP raise a flag that the input loop checks between polls,
/// so they end the prompt the same way.
pub struct TerminalPrompter {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: Option<String>,
    restored: bool,
    terminate: Arc<AtomicBool>,
    signal_ids: Vec<SigId>,
}

/// Registers `flag` to be set on any termination signal.
fn register_termination(flag: &Arc<AtomicBool>) -> io::Result<Vec<SigId>> {
    let mut signals = signal_hook::consts::TERM_SIGNALS.to_vec();
    #[cfg(unix)]
    signals.push(signal_hook::consts::SIGHUP);

    signals
        .into_iter()
        .map(|sig| signal_hook::flag::register(sig, Arc::clone(flag)))
        .collect()
}

/// Puts the terminal back before the default panic message is printed.
pub fn install_panic_hook() {
    let default = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if is_raw_mode_enabled().unwrap_or(false) {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
        default(info);
    }));
}

impl TerminalPrompter {
    pub fn new() -> Result<Self, AppError> {
        let terminate = Arc::new(AtomicBool::new(false));
        let signal_ids = register_termination(&terminate)
            .map_err(|e| AppError::io("registering signal handlers", e))?;

        enable_raw_mode().map_err(|e| AppError::io("enabling raw mode", e))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| AppError::io("entering alternate screen", e))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal =
            Terminal::new(backend).map_err(|e| AppError::io("creating terminal backend", e))?;

        Ok(Self {
            terminal,
            status: None,
            restored: false,
            terminate,
            signal_ids,
        })
    }

    pub fn restore(&mut self) -> Result<(), AppError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        for id in self.signal_ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }

        disable_raw_mode().map_err(|e| AppError::io("disabling raw mode", e))?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| AppError::io("leaving alternate screen", e))?;
        self.terminal
            .show_cursor()
            .map_err(|e| AppError::io("restoring cursor", e))
    }

    fn draw(&mut self, view: &PromptView) -> Result<(), AppError> {
        let status = self.status.clone();
        self.terminal
            .draw(|f| render_prompt(f, view, status.as_deref()))
            .map_err(|e| AppError::io("drawing prompt", e))?;
        Ok(())
    }

    fn next_key(&mut self) -> Result<KeyAction, AppError> {
        loop {
            if self.terminate.load(Ordering::SeqCst) {
                warn!("termination signal received");
                return Ok(KeyAction::Interrupt);
            }
            let ready =
                event::poll(INPUT_POLL).map_err(|e| AppError::io("polling terminal input", e))?;
            if !ready {
                continue;
            }
            let event = event::read().map_err(|e| AppError::io("reading terminal input", e))?;
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }

            if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                info!("interrupt received from terminal");
                return Ok(KeyAction::Interrupt);
            }
            return Ok(KeyAction::Key(code));
        }
    }
}

impl Drop for TerminalPrompter {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<Answer<bool>, AppError> {
        loop {
            self.draw(&PromptView::Confirm { question, default })?;
            match self.next_key()? {
                KeyAction::Interrupt => return Ok(Answer::Interrupted),
                KeyAction::Key(KeyCode::Char('y') | KeyCode::Char('Y')) => {
                    self.status = None;
                    return Ok(Answer::Value(true));
                }
                KeyAction::Key(KeyCode::Char('n') | KeyCode::Char('N')) => {
                    self.status = None;
                    return Ok(Answer::Value(false));
                }
                KeyAction::Key(KeyCode::Enter) => {
                    self.status = None;
                    return Ok(Answer::Value(default));
                }
                KeyAction::Key(_) => {}
            }
        }
    }

    fn select(&mut self, question: &str, choices: &[String]) -> Result<Answer<usize>, AppError> {
        if choices.is_empty() {
            return Err(AppError::io("showing choices", "no choices to select from"));
        }

        let mut selected = 0usize;
        loop {
            self.draw(&PromptView::Choices {
                question,
                choices,
                selected,
            })?;
            match self.next_key()? {
                KeyAction::Interrupt => return Ok(Answer::Interrupted),
                KeyAction::Key(KeyCode::Up | KeyCode::Char('k')) => {
                    selected = choice_above(selected, choices.len());
                }
                KeyAction::Key(KeyCode::Down | KeyCode::Char('j')) => {
                    selected = choice_below(selected, choices.len());
                }
                KeyAction::Key(KeyCode::Char(c)) if c.is_ascii_digit() => {
                    let index = c.to_digit(10).unwrap_or(0) as usize;
                    if index >= 1 && index <= choices.len() {
                        selected = index - 1;
                    }
                }
                KeyAction::Key(KeyCode::Enter) => {
                    debug!(question, choice = %choices[selected], "selected");
                    self.status = None;
                    return Ok(Answer::Value(selected));
                }
                KeyAction::Key(_) => {}
            }
        }
    }

    fn input(&mut self, question: &str, initial: &str) -> Result<Answer<String>, AppError> {
        let mut buffer = initial.to_string();
        loop {
            self.draw(&PromptView::Text {
                question,
                buffer: &buffer,
            })?;
            match self.next_key()? {
                KeyAction::Interrupt => return Ok(Answer::Interrupted),
                KeyAction::Key(KeyCode::Enter) => {
                    self.status = None;
                    return Ok(Answer::Value(buffer.trim().to_string()));
                }
                KeyAction::Key(KeyCode::Backspace) => {
                    buffer.pop();
                }
                KeyAction::Key(KeyCode::Esc) => buffer.clear(),
                KeyAction::Key(KeyCode::Char(c)) => buffer.push(c),
                KeyAction::Key(_) => {}
            }
        }
    }

    fn notify(&mut self, message: &str) {
        info!(message, "operator notice");
        self.status = Some(message.to_string());
    }
}

fn render_prompt(f: &mut Frame, view: &PromptView, status: Option<&str>) {
    let size = f.size();
    let modal = modal_rect_ratio(size, 2, 3);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Line::from(Span::styled(
            "stillframe",
            Style::default().fg(Color::White),
        )))
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(Color::Rgb(0, 153, 255)));
    let inner = block.inner(modal);

    f.render_widget(Clear, modal);
    f.render_widget(block, modal);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let question = match view {
        PromptView::Choices { question, .. }
        | PromptView::Text { question, .. }
        | PromptView::Confirm { question, .. } => *question,
    };
    f.render_widget(
        Paragraph::new(question)
            .wrap(Wrap { trim: true })
            .style(Style::default().add_modifier(Modifier::BOLD)),
        rows[0],
    );

    let help = match view {
        PromptView::Choices {
            choices, selected, ..
        } => {
            let items: Vec<ListItem> = choices
                .iter()
                .enumerate()
                .map(|(i, choice)| {
                    let label = format!("{}. {}", i + 1, choice);
                    if i == *selected {
                        ListItem::new(Line::from(Span::raw(label)))
                            .style(Style::default().fg(Color::Black).bg(Color::White))
                    } else {
                        ListItem::new(Line::from(Span::raw(label).fg(Color::White)))
                    }
                })
                .collect();

            let mut list_state = ListState::default();
            list_state.select(Some(*selected));
            f.render_stateful_widget(
                List::new(items).highlight_style(Style::default()),
                rows[1],
                &mut list_state,
            );
            "↑/↓ move  1-9 jump  Enter choose  Ctrl+C save and exit"
        }
        PromptView::Text { buffer, .. } => {
            f.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::raw("> ").fg(Color::Gray),
                    Span::raw(buffer.to_string()).fg(Color::White),
                    Span::raw("█").fg(Color::Gray),
                ])),
                rows[1],
            );
            "Enter accept  Esc clear  Ctrl+C save and exit"
        }
        PromptView::Confirm { default, .. } => {
            let hint = if *default { "[Y/n]" } else { "[y/N]" };
            f.render_widget(Paragraph::new(hint).fg(Color::White), rows[1]);
            "y yes  n no  Enter default  Ctrl+C save and exit"
        }
    };

    if let Some(message) = status {
        f.render_widget(
            Paragraph::new(message).style(
                Style::default()
                    .fg(Color::Rgb(255, 204, 0))
                    .add_modifier(Modifier::ITALIC),
            ),
            rows[2],
        );
    }
    f.render_widget(Paragraph::new(help).fg(Color::Gray), rows[3]);
}

fn modal_rect_ratio(terminal_size: Rect, numerator: u16, denominator: u16) -> Rect {
    let target_width = terminal_size.width.saturating_mul(numerator) / denominator;
    let target_height = (terminal_size.height.saturating_mul(numerator) / denominator).max(10);

    let max_width = terminal_size.width.saturating_sub(2).max(1);
    let max_height = terminal_size.height.saturating_sub(2).max(1);

    let modal_width = target_width.clamp(1, max_width);
    let modal_height = target_height.clamp(1, max_height);

    let modal_x = (terminal_size.width.saturating_sub(modal_width)) / 2;
    let modal_y = (terminal_size.height.saturating_sub(modal_height)) / 2;

    Rect::new(modal_x, modal_y, modal_width, modal_height)
}

/// Cursor movement in a choice list wraps at both ends.
fn choice_above(selected: usize, len: usize) -> usize {
    match len {
        0 => 0,
        _ => (selected + len - 1) % len,
    }
}

fn choice_below(selected: usize, len: usize) -> usize {
    match len {
        0 => 0,
        _ => (selected + 1) % len,
    }
}
