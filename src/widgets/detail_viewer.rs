use crate::app::Effect;
use crate::model::{Condition, ResourceDetail};
use crate::nav::keys::Action;
use crate::services::trace::format_transition;
use crate::theme::Theme;
use crate::widgets::highlight::highlight_yaml;
use crate::widgets::Widget;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};
use std::sync::Arc;

/// Scrollable view of one resource: health, annotations, then the object YAML.
#[derive(Default)]
pub struct DetailViewer {
    detail: Option<Arc<ResourceDetail>>,
    yaml_lines: Vec<Line<'static>>,
    stale: bool,
    pub scroll_y: u16,
    pub wrap: bool,
    width: u16,
    last_viewport_h: u16,
    last_total: u16,
}

impl DetailViewer {
    /// Show `detail`. Scroll is kept when the same resource is re-shown after
    /// a refresh and reset otherwise.
    pub fn set_content(&mut self, detail: Option<Arc<ResourceDetail>>) {
        let same = match (&self.detail, &detail) {
            (Some(a), Some(b)) => a.title == b.title && a.side_title == b.side_title,
            _ => false,
        };
        if !same {
            self.scroll_y = 0;
        }
        self.yaml_lines = detail
            .as_ref()
            .map(|d| highlight_yaml(&d.yaml))
            .unwrap_or_default();
        self.detail = detail;
        self.stale = false;
    }

    /// The resource vanished from the latest tree; keep the snapshot.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn title(&self) -> Option<&str> {
        self.detail.as_ref().map(|d| d.title.as_str())
    }

    fn health_lines(&self, name: &str, c: &Condition, theme: &Theme) -> Vec<Line<'static>> {
        let status = if c.status.is_empty() {
            "Unknown"
        } else {
            c.status.as_str()
        };
        let head = if c.reason.is_empty() {
            format!("{name}: {status}")
        } else {
            format!("{name}: {status} ({})", c.reason)
        };
        let mut out = vec![Line::styled(head, theme.health(c.is_true()))];
        if !c.message.is_empty() {
            out.push(Line::from(format!("  Message: {}", c.message)));
        }
        out.push(Line::from(format!(
            "  Last Transition Time: {}",
            format_transition(c)
        )));
        out
    }

    fn body(&self, theme: &Theme) -> Vec<Line<'static>> {
        let Some(d) = &self.detail else {
            return vec![Line::styled("No resource selected", theme.text_muted())];
        };
        let mut lines = Vec::new();
        lines.extend(self.health_lines("Synced", &d.synced, theme));
        lines.extend(self.health_lines("Ready", &d.ready, theme));
        lines.push(Line::styled("Annotations:", theme.header()));
        for (k, v) in &d.annotations {
            lines.push(Line::from(format!("  {k}: \"{v}\"")));
        }
        if let Some(err) = &d.error {
            lines.push(Line::styled(format!("Error: {err}"), theme.text_error()));
        }
        let hr_len = (self.width as usize).saturating_sub(4).max(4);
        lines.push(Line::styled("─".repeat(hr_len), theme.text_muted()));
        lines.extend(self.yaml_lines.iter().cloned());
        lines
    }

    fn total_rows(lines: &[Line], wrap: bool, inner_w: u16) -> u16 {
        if !wrap || inner_w == 0 {
            return lines.len().min(u16::MAX as usize) as u16;
        }
        let w = inner_w as usize;
        let rows: usize = lines.iter().map(|l| l.width().max(1).div_ceil(w)).sum();
        rows.min(u16::MAX as usize) as u16
    }

    fn max_scroll(&self) -> u16 {
        self.last_total.saturating_sub(self.last_viewport_h)
    }

    pub fn scroll_percent(&self) -> u16 {
        let max = self.max_scroll();
        if max == 0 {
            100
        } else {
            ((self.scroll_y.min(max) as u32 * 100) / max as u32) as u16
        }
    }
}

impl Widget for DetailViewer {
    fn render(&mut self, f: &mut Frame, area: Rect, _focused: bool, theme: &Theme) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

        let title = self.title().unwrap_or_default();
        let mut header = vec![Span::styled(format!(" {title} "), theme.title())];
        if let Some(d) = self.detail.as_ref().filter(|d| !d.side_title.is_empty()) {
            header.push(Span::styled(format!(" {} ", d.side_title), theme.side_title()));
        }
        if self.is_stale() {
            header.push(Span::styled(" (stale) ", theme.bar_alert()));
        }
        f.render_widget(Paragraph::new(Line::from(header)), rows[0]);

        let lines = self.body(theme);
        self.last_viewport_h = rows[1].height;
        self.last_total = Self::total_rows(&lines, self.wrap, rows[1].width);
        self.scroll_y = self.scroll_y.min(self.max_scroll());
        let mut p = Paragraph::new(lines).scroll((self.scroll_y, 0));
        if self.wrap {
            p = p.wrap(Wrap { trim: false });
        }
        f.render_widget(p, rows[1]);

        let mut footer = format!("{:>3}%", self.scroll_percent());
        if self.wrap {
            footer.push_str("  wrap");
        }
        f.render_widget(
            Paragraph::new(footer)
                .alignment(Alignment::Right)
                .style(theme.text_muted()),
            rows[2],
        );
    }

    fn on_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Up => self.scroll_y = self.scroll_y.saturating_sub(1),
            Action::Down => self.scroll_y = self.scroll_y.saturating_add(1).min(self.max_scroll()),
            Action::PageUp => self.scroll_y = self.scroll_y.saturating_sub(self.last_viewport_h),
            Action::PageDown => {
                self.scroll_y = self
                    .scroll_y
                    .saturating_add(self.last_viewport_h)
                    .min(self.max_scroll())
            }
            Action::Top => self.scroll_y = 0,
            Action::Bottom => self.scroll_y = self.max_scroll(),
            Action::ToggleWrap => self.wrap = !self.wrap,
            _ => {}
        }
        Vec::new()
    }

    fn resize(&mut self, width: u16, _height: u16) {
        self.width = width;
    }
}
