use super::util::{short_hex, token_color};
use crate::{
    app::{Action, AppContext, AppResult, AppView, FocusedPane, MainViewTab},
    components::Component,
    picker::dataset,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
};
use std::cmp::min;

/// Content pane behind the modal: a detail card for the chosen token and a
/// portfolio tab listing every supported token in the same balance-sorted
/// order the picker uses.
#[derive(Debug, Default)]
pub struct MainView {
    portfolio_index: usize,
    table_state: TableState,
}

#[derive(Debug)]
pub enum MainViewCommand {
    NextTab,
    PreviousTab,
    MoveUp,
    MoveDown,
    ChooseHighlighted,
}

impl MainView {
    const TAB_TITLES: &'static [(&'static str, MainViewTab)] = &[
        ("Overview", MainViewTab::Overview),
        ("Portfolio", MainViewTab::Portfolio),
    ];

    fn tab_index(tab: MainViewTab) -> usize {
        Self::TAB_TITLES
            .iter()
            .position(|(_, t)| *t == tab)
            .unwrap_or(0)
    }

    fn render_overview(&self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let lines = match &ctx.state.selected_token {
            Some(token) => vec![
                Line::from(vec![
                    Span::styled("● ", Style::default().fg(token_color(&token.address))),
                    Span::styled(
                        token.symbol.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", token.name),
                        Style::default().fg(Color::Gray),
                    ),
                ]),
                Line::from(""),
                Line::from(format!("Address: {}", token.address)),
                Line::from(format!(
                    "Balance: {}",
                    ctx.state.balances.display(&token.address)
                )),
            ],
            None => vec![
                Line::from("No token selected yet."),
                Line::from(Span::styled(
                    "Press t to open the picker.",
                    Style::default().fg(Color::Gray),
                )),
            ],
        };
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_portfolio(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let tokens = dataset::derive(&ctx.state.supported_tokens, "", &ctx.state.balances);
        if tokens.is_empty() {
            let empty = Paragraph::new("No supported tokens loaded.")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(empty, area);
            return;
        }

        self.portfolio_index = min(self.portfolio_index, tokens.len() - 1);
        self.table_state.select(Some(self.portfolio_index));

        let rows: Vec<Row> = tokens
            .iter()
            .map(|token| {
                let symbol_cell = Cell::from(Line::from(vec![
                    Span::styled("● ", Style::default().fg(token_color(&token.address))),
                    Span::styled(
                        token.symbol.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]));
                let name_cell = Cell::from(Span::styled(
                    token.name.clone(),
                    Style::default().fg(Color::Gray),
                ));
                let address_cell = Cell::from(short_hex(&token.address));
                let amount_cell = Cell::from(
                    Line::from(ctx.state.balances.display(&token.address)).right_aligned(),
                );
                Row::new(vec![symbol_cell, name_cell, address_cell, amount_cell])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Min(12),
                Constraint::Length(15),
                Constraint::Length(14),
            ],
        )
        .row_highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}

impl Component for MainView {
    type Command = MainViewCommand;

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            MainViewCommand::NextTab => {
                ctx.state.navigation.main_view_tab = ctx.state.navigation.main_view_tab.next();
            }
            MainViewCommand::PreviousTab => {
                ctx.state.navigation.main_view_tab = ctx.state.navigation.main_view_tab.previous();
            }
            MainViewCommand::MoveUp => {
                self.portfolio_index = self.portfolio_index.saturating_sub(1);
            }
            MainViewCommand::MoveDown => {
                let len = ctx.state.supported_tokens.len();
                if len > 0 {
                    self.portfolio_index = min(self.portfolio_index + 1, len - 1);
                }
            }
            MainViewCommand::ChooseHighlighted => {
                if matches!(ctx.state.navigation.main_view_tab, MainViewTab::Portfolio) {
                    let tokens =
                        dataset::derive(&ctx.state.supported_tokens, "", &ctx.state.balances);
                    if let Some(token) = tokens.get(self.portfolio_index) {
                        return Ok(Some(Action::TokenChosen(token.clone())));
                    }
                }
            }
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let is_focused = matches!(ctx.state.navigation.focused_pane, FocusedPane::MainView);
        let border_style = if is_focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from("[2] Tokens").style(border_style));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let tab_titles: Vec<Line> = Self::TAB_TITLES
            .iter()
            .map(|(title, _)| Line::from(*title))
            .collect();
        let tabs = Tabs::new(tab_titles)
            .select(Self::tab_index(ctx.state.navigation.main_view_tab))
            .style(Style::default())
            .highlight_style(Style::default().fg(Color::Cyan));
        frame.render_widget(tabs, chunks[0]);

        match ctx.state.navigation.main_view_tab {
            MainViewTab::Overview => self.render_overview(frame, chunks[1], ctx),
            MainViewTab::Portfolio => self.render_portfolio(frame, chunks[1], ctx),
        }
    }
}
