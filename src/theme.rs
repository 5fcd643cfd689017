use crate::model::ColorHint;
use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub fg: Color,
    pub muted: Color,
    /// Tree connectors and the cursor background.
    pub shapes: Color,
    pub frame: Color,
    pub alert: Color,
    pub warn: Color,
    pub ok: Color,
    pub bar_primary: Color,
    pub bar_secondary: Color,
    pub bar_neutral: Color,
    pub title_bg: Color,
}

impl Theme {
    pub fn dracula() -> Self {
        Self {
            fg: Color::Reset,
            muted: Color::DarkGray,
            shapes: Color::Rgb(189, 147, 249),
            frame: Color::Rgb(90, 90, 100),
            alert: Color::Rgb(255, 85, 85),
            warn: Color::Rgb(255, 184, 108),
            ok: Color::Green,
            bar_primary: Color::Magenta,
            bar_secondary: Color::Blue,
            bar_neutral: Color::DarkGray,
            title_bg: Color::Blue,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dracula()
    }
}

impl Theme {
    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.shapes)
    }

    pub fn border_unfocused(&self) -> Style {
        Style::default().fg(self.frame)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text_error(&self) -> Style {
        Style::default().fg(self.alert)
    }

    pub fn connector(&self) -> Style {
        Style::default().fg(self.shapes)
    }

    pub fn header(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn cursor(&self) -> Style {
        Style::default()
            .bg(self.shapes)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    pub fn node(&self, hint: Option<ColorHint>) -> Style {
        match hint {
            Some(ColorHint::Degraded) => Style::default().fg(self.alert),
            Some(ColorHint::Paused) => Style::default().fg(self.warn),
            None => Style::default().fg(self.fg),
        }
    }

    pub fn health(&self, ok: bool) -> Style {
        let c = if ok { self.ok } else { Color::Red };
        Style::default().fg(c).add_modifier(Modifier::BOLD)
    }

    pub fn bar_primary(&self) -> Style {
        Style::default().fg(Color::White).bg(self.bar_primary)
    }

    pub fn bar_secondary(&self) -> Style {
        Style::default().fg(Color::Black).bg(self.bar_secondary)
    }

    pub fn bar_neutral(&self) -> Style {
        Style::default().fg(Color::White).bg(self.bar_neutral)
    }

    pub fn bar_alert(&self) -> Style {
        Style::default().fg(Color::Black).bg(self.alert)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.title_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn side_title(&self) -> Style {
        Style::default().fg(Color::White).bg(self.bar_neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_beats_default_styling() {
        let t = Theme::default();
        assert_eq!(t.node(Some(ColorHint::Degraded)).fg, Some(t.alert));
        assert_eq!(t.node(Some(ColorHint::Paused)).fg, Some(t.warn));
        assert_eq!(t.node(None).fg, Some(Color::Reset));
    }
}
