mod app;

use anyhow::{Context, Result};
use app::App;
use composer_bridge_config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::{env, io::stdout, path::PathBuf, process};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let document = if args.len() == 2 {
        PathBuf::from(&args[1])
    } else if args.len() == 1 {
        match &config.inspector.default_document {
            Some(document) => document.clone(),
            None => {
                eprintln!("Error: No document provided and none configured");
                eprintln!("Usage: {} <document.html>", args[0]);
                eprintln!(
                    "Or set inspector.default_document in {}",
                    config_path.display()
                );
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [document.html]", args[0]);
        process::exit(1);
    };

    let html = std::fs::read_to_string(&document)
        .with_context(|| format!("Failed to read {}", document.display()))?;
    log::info!("Inspecting {}", document.display());
    let mut app = App::new(document.display().to_string(), &html, &config.render);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Left => app.move_left(),
                KeyCode::Right => app.move_right(),
                KeyCode::Home => app.move_line_start(),
                KeyCode::End => app.move_line_end(),
                KeyCode::Char('t') => app.toggle_tree(),
                _ => {}
            }
        }
    }
}

/// Tabs and placeholders are invisible in a terminal; show them.
fn visible(text: &str) -> String {
    text.replace('\t', "⇥   ").replace('\u{a0}', "·")
}

fn document_lines(app: &App) -> Vec<Line<'static>> {
    let caret_style = Style::default().bg(Color::Yellow).fg(Color::Black);
    let (before, at, after) = app.split_at_caret();

    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for (i, part) in before.split('\n').enumerate() {
        if i > 0 {
            lines.push(Line::from(std::mem::take(&mut current)));
        }
        current.push(Span::raw(visible(part)));
    }

    match at {
        "" => current.push(Span::styled(" ", caret_style)),
        "\n" => {
            current.push(Span::styled(" ", caret_style));
            lines.push(Line::from(std::mem::take(&mut current)));
        }
        _ => current.push(Span::styled(visible(at), caret_style)),
    }

    for (i, part) in after.split('\n').enumerate() {
        if i > 0 {
            lines.push(Line::from(std::mem::take(&mut current)));
        }
        current.push(Span::raw(visible(part)));
    }
    lines.push(Line::from(current));
    lines
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    let document = Paragraph::new(document_lines(app))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Display: {}", app.source)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(document, columns[0]);

    let (title, side_text) = if app.show_tree {
        ("Display tree", app.content.debug_tree())
    } else {
        ("Positions", app.info_lines().join("\n"))
    };
    let side = Paragraph::new(side_text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(side, columns[1]);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("←/→: Move | "),
        Span::raw("Home/End: Line | "),
        Span::raw("t: Toggle tree"),
    ]));
    f.render_widget(help, rows[1]);
}
