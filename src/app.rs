use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::action::{Action, Scroll};
use crate::config::{Config, parse_key};
use crate::stream::{ConnectionState, StreamEvent, StreamState};
use crate::ui::theme::{ColorSupport, Theme, resolve_color_support};
use crate::view::{ViewModel, project};

const STATUS_MESSAGE_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub help: KeyCode,
    pub toggle_theme: KeyCode,
    pub reconnect: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &crate::config::KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
            toggle_theme: parse_key(&kb.toggle_theme).unwrap_or(KeyCode::Char('t')),
            reconnect: parse_key(&kb.reconnect).unwrap_or(KeyCode::Char('r')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.reconnect), "Reconnect stream"),
            (key_label(self.toggle_theme), "Toggle light/dark"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("↑↓".to_string(), "Scroll processes"));
        entries.push(("PgUp/PgDn".to_string(), "Scroll a page"));
        entries.push(("Home/End".to_string(), "First/last process"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        _ => "?".to_string(),
    }
}

pub struct App {
    pub running: bool,
    pub stream: StreamState,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub color_support: ColorSupport,
    pub status_message: Option<(String, Instant)>,
    pub endpoint: String,
    pub keybinds: ResolvedKeybinds,
    /// First process row shown in the table.
    pub scroll: usize,
    /// Process rows that fit in the table, updated on every draw.
    pub visible_rows: usize,
    reconnect_requested: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let color_support = resolve_color_support(&config.general.color_support);
        let theme = Theme::from_config(&config.colors.theme, color_support);

        App {
            running: true,
            stream: StreamState::new(),
            input_mode: InputMode::Normal,
            theme,
            color_support,
            status_message: None,
            endpoint: config.stream.event_url(),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            scroll: 0,
            visible_rows: 0,
            reconnect_requested: false,
        }
    }

    /// Feed one stream event into the state cell.
    pub fn on_stream_event(&mut self, event: StreamEvent) -> bool {
        let changed = self.stream.apply(event);
        if changed {
            self.clamp_scroll();
        }
        changed
    }

    /// Current display model, derived fresh from the held snapshot.
    pub fn view(&self) -> Option<ViewModel> {
        self.stream.snapshot().map(project)
    }

    pub fn process_count(&self) -> usize {
        self.stream.snapshot().map_or(0, |s| s.processes.len())
    }

    pub fn on_tick(&mut self) -> bool {
        if let Some((_, created)) = &self.status_message
            && created.elapsed().as_secs() >= STATUS_MESSAGE_SECS
        {
            self.status_message = None;
            return true;
        }
        false
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Scrolling keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Scroll(Scroll::Up),
            KeyCode::Down => return Action::Scroll(Scroll::Down),
            KeyCode::PageUp => return Action::Scroll(Scroll::PageUp),
            KeyCode::PageDown => return Action::Scroll(Scroll::PageDown),
            KeyCode::Home => return Action::Scroll(Scroll::Top),
            KeyCode::End => return Action::Scroll(Scroll::Bottom),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == kb.toggle_theme {
            return Action::ToggleTheme;
        }
        if code == kb.reconnect {
            return Action::Reconnect;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn map_mouse(&self, mouse: MouseEvent) -> Action {
        match mouse.kind {
            MouseEventKind::ScrollUp => Action::Scroll(Scroll::Up),
            MouseEventKind::ScrollDown => Action::Scroll(Scroll::Down),
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Scroll(scroll) => self.scroll(scroll),
            Action::ToggleTheme => {
                self.theme = self.theme.next(self.color_support);
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::Reconnect => {
                if self.stream.is_closed() {
                    return;
                }
                self.reconnect_requested = true;
                self.set_status(format!("Reconnecting to {}", self.endpoint));
            }
            Action::None => {}
        }
    }

    /// Consume a pending reconnect request. The caller owns the stream client
    /// and is responsible for replacing it.
    pub fn take_reconnect_request(&mut self) -> bool {
        if !self.reconnect_requested {
            return false;
        }
        self.reconnect_requested = false;
        self.stream.restart();
        true
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }

    pub fn connection(&self) -> ConnectionState {
        self.stream.connection()
    }

    pub fn set_visible_rows(&mut self, rows: usize) {
        self.visible_rows = rows;
        self.clamp_scroll();
    }

    fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    fn max_scroll(&self) -> usize {
        self.process_count().saturating_sub(self.visible_rows.max(1))
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn scroll(&mut self, scroll: Scroll) {
        let page = self.visible_rows.max(1);
        self.scroll = match scroll {
            Scroll::Up => self.scroll.saturating_sub(1),
            Scroll::Down => self.scroll.saturating_add(1),
            Scroll::PageUp => self.scroll.saturating_sub(page),
            Scroll::PageDown => self.scroll.saturating_add(page),
            Scroll::Top => 0,
            Scroll::Bottom => usize::MAX,
        };
        self.clamp_scroll();
    }
}
