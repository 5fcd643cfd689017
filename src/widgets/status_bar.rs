use crate::nav::cursor::SelectionChanged;
use crate::nav::keys::{FULL_HELP, SHORT_HELP};
use crate::theme::Theme;
use crate::widgets::Widget;
use chrono::{DateTime, Local};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use std::time::Duration;

const ROOT_SYMBOL: &str = "$";

/// Transient message shown until the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Yanked,
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RefreshState {
    #[default]
    Pending,
    Loaded(DateTime<Local>),
    Failed(String),
}

/// Bottom bar: root marker, breadcrumb of the selection, flash, refresh state.
#[derive(Debug, Clone)]
pub struct StatusBar {
    path: Vec<String>,
    separator: String,
    flash: Option<Flash>,
    refresh: RefreshState,
    watch: Option<Duration>,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PATH_SEPARATOR, None)
    }
}

impl StatusBar {
    pub fn new(separator: impl Into<String>, watch: Option<Duration>) -> Self {
        Self {
            path: Vec::new(),
            separator: separator.into(),
            flash: None,
            refresh: RefreshState::Pending,
            watch,
        }
    }

    pub fn on_selection(&mut self, sel: Option<&SelectionChanged>) {
        self.path = sel.map(|s| s.path.clone()).unwrap_or_default();
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn breadcrumb(&self) -> String {
        self.path.join(&self.separator)
    }

    pub fn flash(&mut self, flash: Flash) {
        self.flash = Some(flash);
    }

    pub fn clear_flash(&mut self) {
        self.flash = None;
    }

    pub fn current_flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    pub fn refresh_ok(&mut self, at: DateTime<Local>) {
        self.refresh = RefreshState::Loaded(at);
    }

    pub fn refresh_failed(&mut self, msg: impl Into<String>) {
        self.refresh = RefreshState::Failed(msg.into());
    }

    pub fn refresh_state(&self) -> &RefreshState {
        &self.refresh
    }

    pub fn refresh_label(&self) -> String {
        match (&self.refresh, self.watch) {
            (RefreshState::Pending, _) => String::new(),
            (RefreshState::Failed(msg), _) => {
                format!("refresh failed: {}", msg.lines().next().unwrap_or(""))
            }
            (RefreshState::Loaded(at), Some(every)) => {
                format!("watch {}s · {}", every.as_secs(), at.format("%H:%M:%S"))
            }
            (RefreshState::Loaded(at), None) => format!("loaded {}", at.format("%H:%M:%S")),
        }
    }
}

impl Widget for StatusBar {
    fn render(&mut self, f: &mut Frame, area: Rect, _focused: bool, theme: &Theme) {
        let flash = match self.current_flash() {
            Some(Flash::Yanked) => Some(("yanked".to_string(), theme.bar_secondary())),
            Some(Flash::Error(e)) => Some((e.clone(), theme.bar_alert())),
            None => None,
        };
        let refresh = self.refresh_label();
        let refresh_style = match self.refresh {
            RefreshState::Failed(_) => theme.bar_alert(),
            _ => theme.bar_neutral(),
        };

        let pad = |s: &str| format!(" {s} ");
        let mut constraints = vec![
            Constraint::Length(ROOT_SYMBOL.len() as u16 + 2),
            Constraint::Min(0),
        ];
        if let Some((text, _)) = &flash {
            constraints.push(Constraint::Length(text.chars().count() as u16 + 2));
        }
        if !refresh.is_empty() {
            constraints.push(Constraint::Length(refresh.chars().count() as u16 + 2));
        }
        let cols = Layout::horizontal(constraints).split(area);

        f.render_widget(
            Paragraph::new(pad(ROOT_SYMBOL)).style(theme.bar_primary()),
            cols[0],
        );
        let crumb = fit_tail(&self.breadcrumb(), cols[1].width.saturating_sub(2) as usize);
        f.render_widget(
            Paragraph::new(pad(&crumb)).style(theme.bar_neutral()),
            cols[1],
        );
        let mut next = 2;
        if let Some((text, style)) = flash {
            f.render_widget(Paragraph::new(pad(&text)).style(style), cols[next]);
            next += 1;
        }
        if !refresh.is_empty() {
            f.render_widget(Paragraph::new(pad(&refresh)).style(refresh_style), cols[next]);
        }
    }
}

/// Keep the end of `s` within `width` columns, marking the cut with `…`.
fn fit_tail(s: &str, width: usize) -> String {
    let n = s.chars().count();
    if n <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let tail: String = s.chars().skip(n - (width - 1)).collect();
    format!("…{tail}")
}

/// Lines needed by the help footer at `width`.
pub fn help_height(full: bool, width: u16) -> u16 {
    if !full {
        return 1;
    }
    let per_line = (width / 24).max(1) as usize;
    FULL_HELP.len().div_ceil(per_line) as u16
}

pub fn draw_help(f: &mut Frame, area: Rect, full: bool, theme: &Theme) {
    let key_style = theme.header();
    let desc_style = theme.text_muted();
    let item = |(k, d): &(&str, &str)| {
        vec![
            Span::styled(k.to_string(), key_style),
            Span::styled(format!(" {d}"), desc_style),
        ]
    };
    let lines: Vec<Line> = if full {
        let per_line = (area.width / 24).max(1) as usize;
        FULL_HELP
            .chunks(per_line)
            .map(|chunk| {
                let mut spans = Vec::new();
                for entry in chunk {
                    let text_len = entry.0.chars().count() + entry.1.chars().count() + 1;
                    spans.extend(item(entry));
                    spans.push(Span::raw(" ".repeat(24usize.saturating_sub(text_len))));
                }
                Line::from(spans)
            })
            .collect()
    } else {
        let mut spans = Vec::new();
        for (i, entry) in SHORT_HELP.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" • ", desc_style));
            }
            spans.extend(item(entry));
        }
        vec![Line::from(spans)]
    };
    f.render_widget(Paragraph::new(lines), area);
}
