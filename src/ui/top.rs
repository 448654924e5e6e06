use super::util::short_hex;
use crate::{
    app::{Action, AppContext, AppResult, AppView, FocusedPane},
    components::Component,
};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

#[derive(Debug)]
pub struct TopBar {
    title: String,
    status: Option<String>,
}

impl Default for TopBar {
    fn default() -> Self {
        Self {
            title: "token-tui".to_string(),
            status: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TopCommand {
    ShowStatus(String),
}

impl Component for TopBar {
    type Command = TopCommand;

    fn update(
        &mut self,
        command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            TopCommand::ShowStatus(message) => {
                self.status = Some(message.clone());
            }
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let is_focused = matches!(ctx.state.navigation.focused_pane, FocusedPane::Top);
        let descriptor = match &ctx.state.selected_token {
            Some(token) => format!("{} ({})", token.symbol, short_hex(&token.address)),
            None => "No token selected".to_string(),
        };
        let title = Line::from(format!("[1] {} • {}", self.title, descriptor));
        let style = if is_focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let mut lines = Vec::new();
        lines.push(Line::from("Press t to choose a token • c to configure"));
        if ctx.state.loading.main_view.is_loading {
            lines.push(Line::from(Span::styled(
                "Refreshing balances…",
                Style::default().fg(Color::Yellow),
            )));
        }
        if let Some(status) = self.status.as_ref() {
            lines.push(Line::from(status.clone()).style(Style::default().fg(Color::Gray)));
        }
        if let Some(error) = ctx.state.last_error.as_ref() {
            lines.push(Line::from(Span::styled(
                format!("Error: {error}"),
                Style::default().fg(Color::Red),
            )));
        }

        let missing_rpc = ctx.state.config.rpc_url.is_none();
        let missing_account = ctx.state.config.account.is_none();
        if missing_rpc || missing_account {
            let mut parts = Vec::new();
            if missing_rpc {
                parts.push("TOKEN_TUI_RPC_URL");
            }
            if missing_account {
                parts.push("TOKEN_TUI_ACCOUNT");
            }
            let warning = format!("Missing config: {} (press c)", parts.join(", "));
            lines.push(Line::from(Span::styled(
                warning,
                Style::default().fg(Color::Yellow),
            )));
        }

        let widget = Paragraph::new(lines)
            .style(Style::default().fg(Color::Gray))
            .block(Block::bordered().title(title.style(style)));
        frame.render_widget(widget, area);
    }
}
