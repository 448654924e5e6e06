use crate::{
    app::{Action, AppContext, AppResult, AppState, AppView},
    components::Component,
    picker::{Token, dataset},
    ui::util::{centered_rect, token_color},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
};
use std::cmp::min;

#[derive(Debug, Clone)]
pub enum TokenModalCommand {
    InputChar(char),
    Backspace,
    ClearSearch,
    MoveUp,
    MoveDown,
    ChooseHighlighted,
    ChooseRow(usize),
    Dismiss,
    DismissOutside,
}

/// Screen regions recorded during the last render, used to resolve mouse
/// events. The content rect is the containment boundary for outside-click
/// dismissal.
#[derive(Debug, Clone, Copy)]
struct ModalLayout {
    content: Rect,
    close: Rect,
    list: Rect,
}

/// Token picker modal. Visibility is owned by the app: the modal only asks
/// to be closed by returning [`Action::CloseModal`], and row activation is
/// bubbled up as [`Action::TokenChosen`] for the app to commit.
#[derive(Debug, Default)]
pub struct TokenSelectModal {
    search_term: String,
    highlighted: usize,
    list_state: TableState,
    layout: Option<ModalLayout>,
}

impl TokenSelectModal {
    pub fn command_from_key(event: KeyEvent) -> Option<TokenModalCommand> {
        match (event.modifiers, event.code) {
            (_, KeyCode::Esc) => Some(TokenModalCommand::Dismiss),
            (_, KeyCode::Enter) => Some(TokenModalCommand::ChooseHighlighted),
            (_, KeyCode::Up) => Some(TokenModalCommand::MoveUp),
            (_, KeyCode::Down) => Some(TokenModalCommand::MoveDown),
            (_, KeyCode::Backspace) => Some(TokenModalCommand::Backspace),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(TokenModalCommand::ClearSearch),
            (modifiers, KeyCode::Char(c)) if !modifiers.contains(KeyModifiers::CONTROL) => {
                Some(TokenModalCommand::InputChar(c))
            }
            _ => None,
        }
    }

    /// Map a mouse event onto a command using the last rendered layout. A
    /// left click lands on the close icon, on a token row, elsewhere inside
    /// the panel (ignored), or outside it entirely (dismissal).
    pub fn command_from_mouse(&self, event: MouseEvent) -> Option<TokenModalCommand> {
        let layout = self.layout?;
        let position = Position::new(event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if layout.close.contains(position) {
                    return Some(TokenModalCommand::Dismiss);
                }
                if layout.list.contains(position) {
                    let row = self.list_state.offset() + (event.row - layout.list.y) as usize;
                    return Some(TokenModalCommand::ChooseRow(row));
                }
                if !layout.content.contains(position) {
                    return Some(TokenModalCommand::DismissOutside);
                }
                None
            }
            MouseEventKind::ScrollUp if layout.content.contains(position) => {
                Some(TokenModalCommand::MoveUp)
            }
            MouseEventKind::ScrollDown if layout.content.contains(position) => {
                Some(TokenModalCommand::MoveDown)
            }
            _ => None,
        }
    }

    /// The displayed dataset is always re-derived from current inputs; the
    /// modal keeps no cached copy that could go stale.
    fn dataset_for(&self, state: &AppState) -> Vec<Token> {
        dataset::derive(&state.supported_tokens, &self.search_term, &state.balances)
    }

    fn reset(&mut self) {
        self.search_term.clear();
        self.highlighted = 0;
        self.list_state = TableState::default();
    }

    fn search_line(&self) -> Line<'_> {
        let prompt = Span::styled("› ", Style::default().fg(Color::Gray));
        let cursor = Span::styled(
            "▌",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        );
        if self.search_term.is_empty() {
            Line::from(vec![
                prompt,
                cursor,
                Span::styled(
                    "Search by name, symbol or address",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        } else {
            Line::from(vec![prompt, Span::raw(self.search_term.as_str()), cursor])
        }
    }
}

impl Component for TokenSelectModal {
    type Command = TokenModalCommand;

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            TokenModalCommand::InputChar(c) => {
                self.search_term.push(*c);
                self.highlighted = 0;
            }
            TokenModalCommand::Backspace => {
                self.search_term.pop();
                self.highlighted = 0;
            }
            TokenModalCommand::ClearSearch => {
                self.search_term.clear();
                self.highlighted = 0;
            }
            TokenModalCommand::MoveUp => {
                self.highlighted = self.highlighted.saturating_sub(1);
            }
            TokenModalCommand::MoveDown => {
                let len = self.dataset_for(ctx.state).len();
                if len > 0 {
                    self.highlighted = min(self.highlighted + 1, len - 1);
                }
            }
            TokenModalCommand::ChooseHighlighted => {
                if let Some(token) = self.dataset_for(ctx.state).get(self.highlighted) {
                    return Ok(Some(Action::TokenChosen(token.clone())));
                }
            }
            TokenModalCommand::ChooseRow(index) => {
                if let Some(token) = self.dataset_for(ctx.state).get(*index) {
                    return Ok(Some(Action::TokenChosen(token.clone())));
                }
            }
            TokenModalCommand::Dismiss | TokenModalCommand::DismissOutside => {
                self.reset();
                return Ok(Some(Action::CloseModal));
            }
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        // Dim everything behind the panel without erasing it.
        frame.render_widget(
            Block::default().style(Style::default().fg(Color::DarkGray).bg(Color::Black)),
            area,
        );

        let modal_area = centered_rect(
            min(64, area.width.saturating_sub(4)),
            min(22, area.height.saturating_sub(2)),
            area,
        );
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .title(Span::styled(
                "Select a token",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let close_area = Rect {
            x: modal_area.x + modal_area.width.saturating_sub(6),
            y: modal_area.y,
            width: 5,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                "[ ✕ ]",
                Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            )),
            close_area,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(self.search_line()), chunks[0]);
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Enter Select • Esc Close • Ctrl+U Clear",
                Style::default().fg(Color::DarkGray),
            )),
            chunks[1],
        );

        let list_area = chunks[2];
        let dataset = self.dataset_for(ctx.state);
        if dataset.is_empty() {
            self.highlighted = 0;
            self.list_state.select(None);
            let empty = Paragraph::new("No token matches the search term.")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(empty, list_area);
        } else {
            self.highlighted = min(self.highlighted, dataset.len() - 1);
            self.list_state.select(Some(self.highlighted));

            let rows: Vec<Row> = dataset
                .iter()
                .map(|token| {
                    let is_current = ctx
                        .state
                        .selected_token
                        .as_ref()
                        .is_some_and(|current| current.is_same(token));
                    let marker = if is_current { "✓" } else { " " };
                    let symbol_cell = Cell::from(Line::from(vec![
                        Span::styled(
                            "●",
                            Style::default().fg(token_color(&token.address)),
                        ),
                        Span::raw(format!(" {marker} ")),
                        Span::styled(
                            token.symbol.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                    ]));
                    let name_cell = Cell::from(Span::styled(
                        token.name.clone(),
                        Style::default().fg(Color::Gray),
                    ));
                    let amount_cell = Cell::from(
                        Line::from(ctx.state.balances.display(&token.address)).right_aligned(),
                    );
                    Row::new(vec![symbol_cell, name_cell, amount_cell])
                })
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Length(14),
                    Constraint::Min(10),
                    Constraint::Length(14),
                ],
            )
            .row_highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");
            frame.render_stateful_widget(table, list_area, &mut self.list_state);
        }

        self.layout = Some(ModalLayout {
            content: modal_area,
            close: close_area,
            list: list_area,
        });
    }
}
