use composer_bridge_core::{RenderOptions, RenderedContent, render_html, utf16};

/// Inspector state: one rendered document and a caret in display space.
pub struct App {
    pub source: String,
    pub content: RenderedContent,
    /// Flat display index, always on a grapheme cluster boundary
    pub caret: usize,
    pub show_tree: bool,
}

impl App {
    pub fn new(source: impl Into<String>, html: &str, options: &RenderOptions) -> Self {
        Self {
            source: source.into(),
            content: render_html(html, options),
            caret: 0,
            show_tree: false,
        }
    }

    fn text(&self) -> &str {
        self.content.display_text()
    }

    pub fn move_left(&mut self) {
        if self.caret > 0 {
            self.caret = utf16::floor_cluster(self.text(), self.caret - 1);
        }
    }

    pub fn move_right(&mut self) {
        let len = self.content.display_len();
        if self.caret < len {
            self.caret = utf16::ceil_cluster(self.text(), self.caret + 1).min(len);
        }
    }

    pub fn move_line_start(&mut self) {
        let text = self.text();
        let byte = utf16::to_byte(text, self.caret).unwrap_or(text.len());
        let start = text[..byte].rfind('\n').map_or(0, |newline| newline + 1);
        self.caret = utf16::from_byte(text, start);
    }

    pub fn move_line_end(&mut self) {
        let text = self.text();
        let byte = utf16::to_byte(text, self.caret).unwrap_or(text.len());
        let end = text[byte..]
            .find('\n')
            .map_or(text.len(), |newline| byte + newline);
        self.caret = utf16::from_byte(text, end);
    }

    pub fn toggle_tree(&mut self) {
        self.show_tree = !self.show_tree;
    }

    /// The display text before the caret, the cluster under it and the rest.
    pub fn split_at_caret(&self) -> (&str, &str, &str) {
        let text = self.text();
        let start = utf16::to_byte(text, self.caret).unwrap_or(text.len());
        let next = utf16::ceil_cluster(text, self.caret + 1);
        let end = utf16::to_byte(text, next).unwrap_or(text.len());
        (&text[..start], &text[start..end], &text[end..])
    }

    /// What the caret maps to in every coordinate space.
    pub fn info_lines(&self) -> Vec<String> {
        let mapper = self.content.mapper();
        let mut lines = vec![format!(
            "display index: {} / {}",
            self.caret,
            self.content.display_len()
        )];

        lines.push(match mapper.index_to_logical(self.caret) {
            Ok(logical) => format!(
                "logical offset: {} / {}",
                logical,
                self.content.logical_len()
            ),
            Err(e) => format!("logical offset: {e}"),
        });

        lines.push(match mapper.index_to_position(self.caret) {
            Ok(position) => {
                let label = self
                    .content
                    .tree
                    .kind(position.node)
                    .map(|kind| kind.label())
                    .unwrap_or_default();
                format!(
                    "position: node {} {} @ {}",
                    position.node.0, label, position.offset
                )
            }
            Err(e) => format!("position: {e}"),
        });

        lines.push(String::new());
        lines.push(format!("spans ({}):", self.content.registry.len()));
        for span in self.content.registry.spans() {
            let marker = if span.display.contains(&self.caret) || span.display.end == self.caret {
                "*"
            } else {
                " "
            };
            lines.push(format!(
                "{marker} {}..{} {:?} logical width {}",
                span.display.start, span.display.end, span.kind, span.logical_width
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn app(html: &str) -> App {
        App::new("test", html, &RenderOptions::default())
    }

    #[test]
    fn arrows_move_by_grapheme_cluster() {
        let mut app = app("<p>a\u{1F469}\u{1F3FF}\u{200D}\u{1F680}b</p>");
        app.move_right();
        assert_eq!(app.caret, 1);
        app.move_right();
        assert_eq!(app.caret, 8);
        app.move_right();
        assert_eq!(app.caret, 9);
        app.move_right();
        assert_eq!(app.caret, 9);

        app.move_left();
        assert_eq!(app.caret, 8);
        app.move_left();
        assert_eq!(app.caret, 1);
    }

    #[test]
    fn home_and_end_stay_on_the_line() {
        let mut app = app("<p>ab</p><p>cd</p>");
        app.caret = 4;
        app.move_line_start();
        assert_eq!(app.caret, 3);
        app.move_line_end();
        assert_eq!(app.caret, 5);
    }

    #[test]
    fn split_at_caret_isolates_the_cluster() {
        let mut app = app("<p>ab</p>");
        app.caret = 1;
        assert_eq!(app.split_at_caret(), ("a", "b", ""));
        app.caret = 2;
        assert_eq!(app.split_at_caret(), ("ab", "", ""));
    }

    #[test]
    fn info_shows_both_coordinate_spaces() {
        let mut app = app("<ol><li>x</li></ol>");
        app.caret = 4;
        let info = app.info_lines();

        assert_eq!(info[0], "display index: 4 / 5");
        assert_eq!(info[1], "logical offset: 0 / 1");
        assert!(info[2].starts_with("position: node "));
        assert_eq!(info[4], "spans (1):");
        assert!(info[5].starts_with("* 0..4"));
    }

    #[test]
    fn tree_view_toggles() {
        let mut app = app("<p>a</p>");
        app.toggle_tree();
        assert!(app.show_tree);
        app.toggle_tree();
        assert!(!app.show_tree);
    }
}
