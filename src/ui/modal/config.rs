use crate::{
    app::{Action, AppContext, AppResult, AppView},
    components::Component,
    storage::SettingKey,
    ui::util::centered_rect,
};
use alloy::primitives::Address;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigField {
    RpcUrl,
    Account,
}

impl Default for ConfigField {
    fn default() -> Self {
        ConfigField::RpcUrl
    }
}

#[derive(Debug, Clone)]
pub enum ConfigFormCommand {
    FocusNextField,
    FocusPreviousField,
    InputChar(char),
    Backspace,
    Submit,
    Cancel,
    ClearField,
}

/// Form for the two values balance fetching needs: an RPC endpoint and the
/// account whose balances are shown. Saved values land in the settings
/// partition; env vars override them at startup.
#[derive(Debug, Default)]
pub struct ConfigModal {
    rpc_url_value: String,
    account_value: String,
    focused_field: ConfigField,
    message: Option<String>,
}

impl ConfigModal {
    pub fn command_from_key(event: KeyEvent) -> Option<ConfigFormCommand> {
        use crossterm::event::{KeyCode, KeyModifiers};
        match (event.modifiers, event.code) {
            (_, KeyCode::Esc) => Some(ConfigFormCommand::Cancel),
            (KeyModifiers::NONE, KeyCode::Tab) | (KeyModifiers::NONE, KeyCode::Down) => {
                Some(ConfigFormCommand::FocusNextField)
            }
            (KeyModifiers::SHIFT, KeyCode::Tab) | (KeyModifiers::NONE, KeyCode::Up) => {
                Some(ConfigFormCommand::FocusPreviousField)
            }
            (_, KeyCode::Enter) => Some(ConfigFormCommand::Submit),
            (_, KeyCode::Backspace) => Some(ConfigFormCommand::Backspace),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(ConfigFormCommand::ClearField),
            (modifiers, KeyCode::Char(c)) if !modifiers.contains(KeyModifiers::CONTROL) => {
                Some(ConfigFormCommand::InputChar(c))
            }
            _ => None,
        }
    }

    fn selected_value(&mut self) -> &mut String {
        match self.focused_field {
            ConfigField::RpcUrl => &mut self.rpc_url_value,
            ConfigField::Account => &mut self.account_value,
        }
    }

    fn field_title(field: ConfigField) -> &'static str {
        match field {
            ConfigField::RpcUrl => "RPC URL",
            ConfigField::Account => "Account address",
        }
    }

    fn cycle_field(&mut self) {
        self.focused_field = match self.focused_field {
            ConfigField::RpcUrl => ConfigField::Account,
            ConfigField::Account => ConfigField::RpcUrl,
        };
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.rpc_url_value.trim().is_empty() {
            return Err("An RPC URL is required");
        }
        if Address::from_str(self.account_value.trim()).is_err() {
            return Err("Account must be a 0x-prefixed 20-byte hex address");
        }
        Ok(())
    }

    fn save(&mut self, ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        if let Err(message) = self.validate() {
            self.message = Some(message.to_string());
            return Ok(None);
        }

        let rpc_url = self.rpc_url_value.trim();
        let account = self.account_value.trim();

        ctx.storage.settings().set_value(SettingKey::RpcUrl, rpc_url)?;
        ctx.storage.settings().set_value(SettingKey::Account, account)?;

        ctx.state.config.rpc_url = Some(rpc_url.to_string());
        ctx.state.config.account = Some(account.to_string());
        self.message = Some("Configuration saved".into());
        Ok(Some(Action::ConfigSaved))
    }

    fn apply_command(
        &mut self,
        command: &ConfigFormCommand,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            ConfigFormCommand::FocusNextField | ConfigFormCommand::FocusPreviousField => {
                self.message = None;
                self.cycle_field();
            }
            ConfigFormCommand::InputChar(c) => {
                self.message = None;
                self.selected_value().push(*c);
            }
            ConfigFormCommand::Backspace => {
                self.message = None;
                self.selected_value().pop();
            }
            ConfigFormCommand::ClearField => {
                self.message = None;
                self.selected_value().clear();
            }
            ConfigFormCommand::Submit => return self.save(ctx),
            ConfigFormCommand::Cancel => return Ok(Some(Action::CloseModal)),
        }
        Ok(None)
    }
}

impl Component for ConfigModal {
    type Command = ConfigFormCommand;

    fn init(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()> {
        self.rpc_url_value = ctx.state.config.rpc_url.clone().unwrap_or_default();
        self.account_value = ctx.state.config.account.clone().unwrap_or_default();
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        self.apply_command(command, ctx)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let modal_area = centered_rect(72, 15, area);
        frame.render_widget(Clear, modal_area);

        let title = if ctx.state.config.rpc_url.is_some() && ctx.state.config.account.is_some() {
            "Update Configuration"
        } else {
            "Configuration Required"
        };

        let block = Block::default()
            .title(Span::styled(
                title,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));

        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(2),
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Length(2),
                ]
                .as_ref(),
            )
            .split(inner);

        let intro = Paragraph::new(Text::raw(
            "Enter an endpoint and account to enable balance lookups.",
        ))
        .alignment(Alignment::Center);
        frame.render_widget(intro, chunks[0]);

        for (idx, (field, target_area)) in [
            (ConfigField::RpcUrl, chunks[1]),
            (ConfigField::Account, chunks[2]),
        ]
        .into_iter()
        .enumerate()
        {
            let value = match field {
                ConfigField::RpcUrl => &self.rpc_url_value,
                ConfigField::Account => &self.account_value,
            };
            let placeholder = if value.trim().is_empty() {
                "<required>"
            } else {
                value
            };
            let is_focused = self.focused_field == field;
            let mut spans = Vec::new();
            spans.push(Span::styled(
                format!("{}: ", ConfigModal::field_title(field)),
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                placeholder.to_string(),
                if is_focused {
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::Blue)
                        .add_modifier(Modifier::BOLD)
                } else if value.trim().is_empty() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                },
            ));
            if is_focused {
                spans.push(Span::styled(
                    " ▌",
                    Style::default()
                        .fg(Color::LightCyan)
                        .add_modifier(Modifier::BOLD),
                ));
            }

            let paragraph = Paragraph::new(Line::from(spans))
                .block(Block::default().borders(Borders::NONE))
                .alignment(Alignment::Left);
            frame.render_widget(paragraph, target_area);

            if idx == 0 {
                let hint = Paragraph::new(Line::from(Span::styled(
                    format!(
                        "Rotate fields with Tab • Clear with Ctrl+U • Stored in {}",
                        ctx.state.storage_root.display()
                    ),
                    Style::default().fg(Color::Gray),
                )))
                .alignment(Alignment::Left);
                frame.render_widget(hint, chunks[3]);
            }
        }

        let status_line = if let Some(message) = self.message.as_ref() {
            Paragraph::new(Span::styled(
                message.clone(),
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Paragraph::new(Span::styled(
                "Submit with Enter. Cancel with Esc.",
                Style::default().fg(Color::Gray),
            ))
        };
        frame.render_widget(status_line, chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::storage::Storage;
    use tempfile::tempdir;

    fn run_update(
        modal: &mut ConfigModal,
        state: &mut AppState,
        storage: &mut Storage,
        command: ConfigFormCommand,
    ) -> Option<Action> {
        let mut ctx = AppContext { state, storage };
        modal.update(&command, &mut ctx).unwrap()
    }

    #[test]
    fn submit_rejects_a_malformed_account() {
        let temp = tempdir().unwrap();
        let mut storage = Storage::open(temp.path()).unwrap();
        let mut state = AppState::default();
        let mut modal = ConfigModal {
            rpc_url_value: "http://127.0.0.1:8545".into(),
            account_value: "not-an-address".into(),
            ..ConfigModal::default()
        };

        let action = run_update(&mut modal, &mut state, &mut storage, ConfigFormCommand::Submit);
        assert!(action.is_none());
        assert!(modal.message.as_deref().unwrap_or_default().contains("hex"));
        assert!(state.config.account.is_none());
    }

    #[test]
    fn submit_persists_and_updates_state() {
        let temp = tempdir().unwrap();
        let mut storage = Storage::open(temp.path()).unwrap();
        let mut state = AppState::default();
        let mut modal = ConfigModal {
            rpc_url_value: "http://127.0.0.1:8545".into(),
            account_value: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".into(),
            ..ConfigModal::default()
        };

        let action = run_update(&mut modal, &mut state, &mut storage, ConfigFormCommand::Submit);
        assert!(matches!(action, Some(Action::ConfigSaved)));
        assert_eq!(
            state.config.rpc_url.as_deref(),
            Some("http://127.0.0.1:8545")
        );
        assert_eq!(
            storage
                .settings()
                .get_value(SettingKey::Account)
                .unwrap()
                .as_deref(),
            Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }
}
