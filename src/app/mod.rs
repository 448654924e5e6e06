use crate::{
    components::Component,
    picker::{NormalizedBalances, Token, TokenBalance},
    storage::{SettingKey, Storage, TokenRecord},
    ui::{
        bottom_bar::BottomBar,
        main_view::{MainView, MainViewCommand},
        modal::{ConfigFormCommand, ConfigModal, TokenModalCommand, TokenSelectModal},
        top::{TopBar, TopCommand},
        util::short_hex,
    },
};
pub type AppResult<T> = color_eyre::Result<T>;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent,
};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
};
use std::{
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};
use tokio::runtime::{Handle, Runtime};

mod rpc;
mod tokenlist;

pub use navigation::{ActiveModal, FocusedPane, MainViewTab};

const SELECTED_TOKEN_KEY: &str = "app:selected_token";

/// Central application type that orchestrates state and delegates to UI components.
pub struct App {
    running: bool,
    pub state: AppState,
    pub storage: Storage,
    top_bar: TopBar,
    main_view: MainView,
    bottom_bar: BottomBar,
    token_modal: TokenSelectModal,
    config_modal: ConfigModal,
    #[allow(dead_code)]
    runtime: Runtime,
    runtime_handle: Handle,
    message_rx: mpsc::Receiver<Message>,
    message_tx: mpsc::Sender<Message>,
}

impl App {
    pub fn new() -> AppResult<Self> {
        let mut state = AppState::default();
        let mut storage = Storage::open_default()?;
        let mut top_bar = TopBar::default();
        let mut main_view = MainView::default();
        let mut bottom_bar = BottomBar::default();
        let mut token_modal = TokenSelectModal::default();
        let mut config_modal = ConfigModal::default();
        let runtime = Runtime::new()?;
        let runtime_handle = runtime.handle().clone();
        let (message_tx, message_rx) = mpsc::channel();

        state.storage_root = storage.root().to_path_buf();
        state.config = ConfigState {
            rpc_url: load_setting(&storage, SettingKey::RpcUrl)?,
            account: load_setting(&storage, SettingKey::Account)?,
            token_list_url: load_setting(&storage, SettingKey::TokenListUrl)?,
        };

        let records = storage.tokens().list()?;
        state.supported_tokens = if records.is_empty() {
            tokenlist::default_tokens()
        } else {
            records
                .into_iter()
                .map(|record| Token {
                    address: record.address,
                    symbol: record.symbol,
                    name: record.name,
                })
                .collect()
        };

        // Restore the last chosen token by its address; the list may have
        // changed since, in which case nothing is selected.
        if let Some(raw) = storage.settings().get(SELECTED_TOKEN_KEY)? {
            if let Ok(address) = String::from_utf8(raw) {
                state.selected_token = state
                    .supported_tokens
                    .iter()
                    .find(|token| token.address.eq_ignore_ascii_case(&address))
                    .cloned();
            }
        }

        {
            let mut ctx = AppContext {
                state: &mut state,
                storage: &mut storage,
            };
            top_bar.init(&mut ctx)?;
            main_view.init(&mut ctx)?;
            bottom_bar.init(&mut ctx)?;
            token_modal.init(&mut ctx)?;
            config_modal.init(&mut ctx)?;
        }

        let mut app = Self {
            running: false,
            state,
            storage,
            top_bar,
            main_view,
            bottom_bar,
            token_modal,
            config_modal,
            runtime,
            runtime_handle,
            message_rx,
            message_tx,
        };
        app.start_token_list_refresh();
        app.start_balance_refresh();
        Ok(app)
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        self.running = true;
        crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
        while self.running {
            self.tick()?;
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        crossterm::execute!(std::io::stdout(), DisableMouseCapture)?;
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let view = AppView { state: &self.state };

        self.top_bar.render(frame, layout[0], &view);
        self.main_view.render(frame, layout[1], &view);
        self.bottom_bar.render(frame, layout[2], &view);

        match self.state.navigation.active_modal {
            ActiveModal::TokenSelect => self.token_modal.render(frame, frame.area(), &view),
            ActiveModal::Config => self.config_modal.render(frame, frame.area(), &view),
            ActiveModal::None => {}
        }
    }

    fn handle_events(&mut self) -> AppResult<()> {
        // Poll instead of blocking so messages from background fetches get
        // drained even while the keyboard is idle.
        if !event::poll(Duration::from_millis(150))? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key)?,
            Event::Mouse(mouse) => self.on_mouse_event(mouse)?,
            Event::Resize(_, _) => {}
            _ => {}
        }
        Ok(())
    }

    fn on_key_event(&mut self, key: KeyEvent) -> AppResult<()> {
        match self.state.navigation.active_modal {
            ActiveModal::TokenSelect => {
                if let Some(command) = TokenSelectModal::command_from_key(key) {
                    self.token_modal_command(command)?;
                }
                return Ok(());
            }
            ActiveModal::Config => {
                if let Some(command) = ConfigModal::command_from_key(key) {
                    self.config_modal_command(command)?;
                }
                return Ok(());
            }
            ActiveModal::None => {}
        }

        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => {
                self.dispatch(Action::Quit)
            }
            (KeyModifiers::NONE, KeyCode::Char('t')) => self.dispatch(Action::OpenTokenModal),
            (KeyModifiers::NONE, KeyCode::Char('c')) => self.dispatch(Action::OpenConfigModal),
            (KeyModifiers::NONE, KeyCode::Char('r')) => self.dispatch(Action::RefreshBalances),
            (KeyModifiers::NONE, KeyCode::Tab) => self.dispatch(Action::FocusNextPane),
            (KeyModifiers::SHIFT, KeyCode::Tab | KeyCode::BackTab) => {
                self.dispatch(Action::FocusPreviousPane)
            }
            (KeyModifiers::NONE, KeyCode::Char('[')) => {
                self.main_view_command(MainViewCommand::PreviousTab)?;
            }
            (KeyModifiers::NONE, KeyCode::Char(']')) => {
                self.main_view_command(MainViewCommand::NextTab)?;
            }
            (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down)
                if matches!(self.state.navigation.focused_pane, FocusedPane::MainView) =>
            {
                self.main_view_command(MainViewCommand::MoveDown)?;
            }
            (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up)
                if matches!(self.state.navigation.focused_pane, FocusedPane::MainView) =>
            {
                self.main_view_command(MainViewCommand::MoveUp)?;
            }
            (KeyModifiers::NONE, KeyCode::Enter) => match self.state.navigation.focused_pane {
                FocusedPane::MainView => {
                    self.main_view_command(MainViewCommand::ChooseHighlighted)?;
                }
                _ => self.dispatch(Action::OpenTokenModal),
            },
            (KeyModifiers::NONE, KeyCode::Char(d)) if d.is_ascii_digit() => {
                if let Some(pane) = d
                    .to_digit(10)
                    .and_then(|n| FocusedPane::from_number(n as usize))
                {
                    self.dispatch(Action::FocusPane(pane));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) -> AppResult<()> {
        if matches!(
            self.state.navigation.active_modal,
            ActiveModal::TokenSelect
        ) {
            if let Some(command) = self.token_modal.command_from_mouse(mouse) {
                self.token_modal_command(command)?;
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusPane(pane) => self.state.navigation.focused_pane = pane,
            Action::FocusNextPane => self.state.navigation.focus_next(),
            Action::FocusPreviousPane => self.state.navigation.focus_previous(),
            Action::OpenTokenModal => {
                self.state.navigation.active_modal = ActiveModal::TokenSelect;
                self.state.navigation.focused_pane = FocusedPane::Modal;
            }
            Action::OpenConfigModal => {
                self.state.navigation.active_modal = ActiveModal::Config;
                self.state.navigation.focused_pane = FocusedPane::Modal;
            }
            Action::CloseModal => {
                self.state.navigation.active_modal = ActiveModal::None;
                self.state.navigation.focused_pane = FocusedPane::MainView;
            }
            Action::TokenChosen(token) => {
                // The selection is committed before the modal closes.
                if let Err(error) = self
                    .storage
                    .settings()
                    .put(SELECTED_TOKEN_KEY, token.address.as_bytes())
                {
                    self.state.last_error = Some(error.to_string());
                }
                let status = format!("Selected {} ({})", token.symbol, short_hex(&token.address));
                self.state.selected_token = Some(token);
                let _ = self.top_bar_command(TopCommand::ShowStatus(status));
                self.dispatch(Action::CloseModal);
            }
            Action::ConfigSaved => {
                self.dispatch(Action::CloseModal);
                self.start_balance_refresh();
            }
            Action::RefreshBalances => self.start_balance_refresh(),
            Action::LoadingStarted(pane) => self.state.loading.set_loading(pane, true),
            Action::LoadingFinished(pane) => self.state.loading.set_loading(pane, false),
        }
    }

    fn token_modal_command(&mut self, command: TokenModalCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            storage: &mut self.storage,
        };
        if let Some(action) = self.token_modal.update(&command, &mut ctx)? {
            self.dispatch(action);
        }
        Ok(())
    }

    fn config_modal_command(&mut self, command: ConfigFormCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            storage: &mut self.storage,
        };
        if let Some(action) = self.config_modal.update(&command, &mut ctx)? {
            self.dispatch(action);
        }
        Ok(())
    }

    fn main_view_command(&mut self, command: MainViewCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            storage: &mut self.storage,
        };
        if let Some(action) = self.main_view.update(&command, &mut ctx)? {
            self.dispatch(action);
        }
        Ok(())
    }

    fn top_bar_command(&mut self, command: TopCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            storage: &mut self.storage,
        };
        if let Some(action) = self.top_bar.update(&command, &mut ctx)? {
            self.dispatch(action);
        }
        Ok(())
    }

    fn command_bus(&self) -> CommandBus {
        CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone())
    }

    fn start_balance_refresh(&mut self) {
        let (Some(rpc_url), Some(account)) = (
            self.state.config.rpc_url.clone(),
            self.state.config.account.clone(),
        ) else {
            return;
        };
        let tokens = self.state.supported_tokens.clone();
        self.dispatch(Action::LoadingStarted(FocusedPane::MainView));
        let bus = self.command_bus();
        bus.spawn_async(move || async move {
            match rpc::fetch_token_balances(&rpc_url, &account, tokens).await {
                Ok(balances) => Message::BalancesFetched { account, balances },
                Err(error) => Message::BalancesFailed {
                    error: error.to_string(),
                },
            }
        });
    }

    fn start_token_list_refresh(&mut self) {
        let Some(url) = self.state.config.token_list_url.clone() else {
            return;
        };
        self.dispatch(Action::LoadingStarted(FocusedPane::Top));
        let bus = self.command_bus();
        bus.spawn_async(move || async move {
            match tokenlist::fetch_token_list(&url, tokenlist::MAINNET_CHAIN_ID).await {
                Ok(tokens) => Message::TokenListLoaded { tokens },
                Err(error) => Message::TokenListFailed {
                    error: error.to_string(),
                },
            }
        });
    }

    fn tick(&mut self) -> AppResult<()> {
        self.drain_messages();
        Ok(())
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.message_rx.try_recv() {
            match message {
                Message::BalancesFetched { account, balances } => {
                    self.state.balances.absorb(&balances);
                    self.dispatch(Action::LoadingFinished(FocusedPane::MainView));
                    let _ = self.top_bar_command(TopCommand::ShowStatus(format!(
                        "Balances updated for {}",
                        short_hex(&account)
                    )));
                }
                Message::BalancesFailed { error } => {
                    self.dispatch(Action::LoadingFinished(FocusedPane::MainView));
                    self.state.last_error = Some(error.clone());
                    let _ = self.top_bar_command(TopCommand::ShowStatus(format!(
                        "Balance refresh failed: {error}"
                    )));
                }
                Message::TokenListLoaded { tokens } => {
                    self.dispatch(Action::LoadingFinished(FocusedPane::Top));
                    let records: Vec<TokenRecord> = tokens
                        .iter()
                        .map(|token| TokenRecord {
                            address: token.address.clone(),
                            symbol: token.symbol.clone(),
                            name: token.name.clone(),
                        })
                        .collect();
                    if let Err(error) = self.storage.tokens().replace_all(&records) {
                        self.state.last_error = Some(error.to_string());
                    }
                    let count = tokens.len();
                    self.state.supported_tokens = tokens;
                    let _ = self.top_bar_command(TopCommand::ShowStatus(format!(
                        "Token list updated ({count} tokens)"
                    )));
                }
                Message::TokenListFailed { error } => {
                    self.dispatch(Action::LoadingFinished(FocusedPane::Top));
                    self.state.last_error = Some(error.clone());
                    let _ = self.top_bar_command(TopCommand::ShowStatus(format!(
                        "Token list refresh failed: {error}"
                    )));
                }
            }
        }
    }
}

fn load_setting(storage: &Storage, key: SettingKey) -> AppResult<Option<String>> {
    if let Ok(value) = std::env::var(key.env_var()) {
        if !value.trim().is_empty() {
            return Ok(Some(value));
        }
    }
    storage.settings().get_value(key)
}

/// Immutable state shared across components.
#[derive(Debug, Default)]
pub struct AppState {
    pub navigation: NavigationState,
    pub loading: LoadingState,
    pub config: ConfigState,
    pub supported_tokens: Vec<Token>,
    pub balances: NormalizedBalances,
    pub selected_token: Option<Token>,
    pub storage_root: PathBuf,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct ConfigState {
    pub rpc_url: Option<String>,
    pub account: Option<String>,
    pub token_list_url: Option<String>,
}

#[derive(Debug, Default)]
pub struct NavigationState {
    pub focused_pane: FocusedPane,
    pub main_view_tab: MainViewTab,
    pub active_modal: ActiveModal,
}

impl NavigationState {
    pub fn focus_next(&mut self) {
        self.focused_pane = match self.focused_pane {
            FocusedPane::Top => FocusedPane::MainView,
            FocusedPane::MainView => FocusedPane::BottomBar,
            FocusedPane::BottomBar | FocusedPane::Modal => FocusedPane::Top,
        };
    }

    pub fn focus_previous(&mut self) {
        self.focused_pane = match self.focused_pane {
            FocusedPane::Top => FocusedPane::BottomBar,
            FocusedPane::MainView => FocusedPane::Top,
            FocusedPane::BottomBar => FocusedPane::MainView,
            FocusedPane::Modal => FocusedPane::Top,
        };
    }
}

#[derive(Debug, Default)]
pub struct LoadingState {
    pub top: PaneLoading,
    pub main_view: PaneLoading,
}

impl LoadingState {
    pub fn set_loading(&mut self, pane: FocusedPane, value: bool) {
        let target = match pane {
            FocusedPane::Top => &mut self.top,
            FocusedPane::MainView => &mut self.main_view,
            FocusedPane::BottomBar | FocusedPane::Modal => return,
        };
        target.is_loading = value;
        target.started_at = if value { Some(Instant::now()) } else { None };
    }
}

#[derive(Debug, Default)]
pub struct PaneLoading {
    pub is_loading: bool,
    pub started_at: Option<Instant>,
}

/// Mutable context passed to components while handling logic.
pub struct AppContext<'a> {
    pub state: &'a mut AppState,
    pub storage: &'a mut Storage,
}

/// Read-only context used during rendering.
pub struct AppView<'a> {
    pub state: &'a AppState,
}

#[derive(Clone)]
pub struct CommandBus {
    sender: mpsc::Sender<Message>,
    handle: Handle,
}

impl CommandBus {
    pub fn new(sender: mpsc::Sender<Message>, handle: Handle) -> Self {
        Self { sender, handle }
    }

    pub fn spawn_async<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Message> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let message = task().await;
            let _ = sender.send(message);
        });
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    BalancesFetched {
        account: String,
        balances: Vec<TokenBalance>,
    },
    BalancesFailed {
        error: String,
    },
    TokenListLoaded {
        tokens: Vec<Token>,
    },
    TokenListFailed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    FocusPane(FocusedPane),
    FocusNextPane,
    FocusPreviousPane,
    OpenTokenModal,
    OpenConfigModal,
    CloseModal,
    TokenChosen(Token),
    ConfigSaved,
    RefreshBalances,
    LoadingStarted(FocusedPane),
    LoadingFinished(FocusedPane),
}

mod navigation {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FocusedPane {
        Top,
        MainView,
        BottomBar,
        Modal,
    }

    impl FocusedPane {
        pub fn from_number(number: usize) -> Option<Self> {
            match number {
                1 => Some(Self::Top),
                2 => Some(Self::MainView),
                3 => Some(Self::BottomBar),
                _ => None,
            }
        }
    }

    impl Default for FocusedPane {
        fn default() -> Self {
            Self::MainView
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ActiveModal {
        None,
        TokenSelect,
        Config,
    }

    impl Default for ActiveModal {
        fn default() -> Self {
            Self::None
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MainViewTab {
        Overview,
        Portfolio,
    }

    impl MainViewTab {
        pub fn next(self) -> Self {
            match self {
                MainViewTab::Overview => MainViewTab::Portfolio,
                MainViewTab::Portfolio => MainViewTab::Overview,
            }
        }

        pub fn previous(self) -> Self {
            match self {
                MainViewTab::Overview => MainViewTab::Portfolio,
                MainViewTab::Portfolio => MainViewTab::Overview,
            }
        }
    }

    impl Default for MainViewTab {
        fn default() -> Self {
            Self::Overview
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn focus_cycles_through_panes() {
        let mut navigation = NavigationState::default();
        assert_eq!(navigation.focused_pane, FocusedPane::MainView);
        navigation.focus_next();
        assert_eq!(navigation.focused_pane, FocusedPane::BottomBar);
        navigation.focus_next();
        assert_eq!(navigation.focused_pane, FocusedPane::Top);
        navigation.focus_previous();
        assert_eq!(navigation.focused_pane, FocusedPane::BottomBar);
    }

    #[test]
    fn main_view_tabs_wrap_both_ways() {
        assert_eq!(MainViewTab::Overview.next(), MainViewTab::Portfolio);
        assert_eq!(MainViewTab::Portfolio.next(), MainViewTab::Overview);
        assert_eq!(MainViewTab::Overview.previous(), MainViewTab::Portfolio);
    }

    #[test]
    fn load_setting_falls_back_to_storage() {
        let temp = tempdir().unwrap();
        let storage = Storage::open(temp.path()).unwrap();
        storage
            .settings()
            .set_value(SettingKey::TokenListUrl, "https://tokens.example/list.json")
            .unwrap();

        let value = load_setting(&storage, SettingKey::TokenListUrl).unwrap();
        assert_eq!(value.as_deref(), Some("https://tokens.example/list.json"));
    }
}
