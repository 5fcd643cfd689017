use ratatui::prelude::*;
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SynStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME: OnceLock<Theme> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    THEME.get_or_init(|| {
        let ts = ThemeSet::load_defaults();
        ts.themes
            .get("base16-ocean.dark")
            .cloned()
            .or_else(|| ts.themes.into_values().next())
            .unwrap_or_default()
    })
}

fn syn_to_tui_color(c: syntect::highlighting::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

fn to_style(st: SynStyle) -> Style {
    let mut style = Style::default().fg(syn_to_tui_color(st.foreground));
    if st.font_style.contains(FontStyle::BOLD) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if st.font_style.contains(FontStyle::ITALIC) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    style
}

/// Highlight a YAML document line by line. Lines the highlighter rejects are
/// kept as plain text.
pub fn highlight_yaml(text: &str) -> Vec<Line<'static>> {
    let ps = syntax_set();
    let syntax = ps
        .find_syntax_by_extension("yaml")
        .unwrap_or_else(|| ps.find_syntax_plain_text());
    let mut high = HighlightLines::new(syntax, theme());
    text.lines()
        .map(|line| match high.highlight_line(line, ps) {
            Ok(regions) => Line::from(
                regions
                    .into_iter()
                    .map(|(st, seg)| Span::styled(seg.to_string(), to_style(st)))
                    .collect::<Vec<_>>(),
            ),
            Err(_) => Line::from(line.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_text_and_line_count() {
        let yaml = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: demo\n";
        let lines = highlight_yaml(yaml);
        assert_eq!(lines.len(), 4);
        let flat: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(flat[3], "  name: demo");
    }
}
