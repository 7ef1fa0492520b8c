use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use miette::Result;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
};

use tab_jump::{
    App, Config,
    check::check_position,
    logging,
    renderer::CodeRenderer,
    ui::{EditorWidget, StatusBar},
};

/// A terminal editor where Tab steps over closing brackets and quotes
#[derive(Parser)]
#[command(name = "tab-jump")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Files to open
    files: Vec<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize default configuration file
    InitConfig,
    /// List available syntax highlighting themes
    ListThemes,
    /// Print whether Tab would jump at a position of a file
    Check {
        file: PathBuf,
        /// 1-based line number
        #[arg(long)]
        line: usize,
        /// 1-based column number
        #[arg(long)]
        column: usize,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::InitConfig) => return init_config(cli.config),
        Some(Commands::ListThemes) => return list_themes(),
        _ => {}
    }

    let (config, config_error) = load_config(cli.config.as_ref())?;
    if let Err(e) = logging::init(&config.log) {
        eprintln!("Warning: {:?}", e);
    }
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "config file ignored, using defaults");
    }

    if let Some(Commands::Check {
        file,
        line,
        column,
        json,
    }) = cli.command
    {
        return check(config, file, line, column, json);
    }

    let mut app = App::with_files(config, &cli.files)?;

    // Setup terminal
    enable_raw_mode().map_err(|e| miette::miette!("Failed to enable raw mode: {}", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .map_err(|e| miette::miette!("Failed to enter alternate screen: {}", e))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| miette::miette!("Failed to create terminal: {}", e))?;

    // Run app
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().map_err(|e| miette::miette!("Failed to disable raw mode: {}", e))?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )
    .map_err(|e| miette::miette!("Failed to leave alternate screen: {}", e))?;
    terminal
        .show_cursor()
        .map_err(|e| miette::miette!("Failed to show cursor: {}", e))?;

    if let Err(e) = res {
        tracing::error!(error = %e, "editor loop failed");
        eprintln!("Error: {}", e);
    }

    Ok(())
}

/// Load the config file, falling back to defaults when it is broken
///
/// An explicitly given file must load. The ignored error is returned so it
/// can be logged once logging is set up.
fn load_config(path: Option<&PathBuf>) -> Result<(Config, Option<miette::Report>)> {
    if let Some(path) = path {
        return Ok((Config::load_from_file(path)?, None));
    }

    match Config::load_default() {
        Ok(config) => Ok((config, None)),
        Err(e) => {
            eprintln!("Warning: {}; using default configuration", e);
            Ok((Config::default(), Some(e)))
        }
    }
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|f| {
                let main_chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Min(1),    // Editor
                        Constraint::Length(1), // Status bar
                    ])
                    .split(f.area());
                let editor_area = main_chunks[0];
                app.set_viewport_height(editor_area.height as usize);

                let editor_config = &app.config().editor;
                let editor = EditorWidget::new(app.buffer())
                    .with_scroll(app.scroll_offset())
                    .with_code_renderer(app.code_renderer())
                    .with_tab_width(editor_config.tab_width)
                    .with_line_numbers(editor_config.show_line_numbers)
                    .with_current_line_highlight(editor_config.show_current_line_highlight);
                f.render_widget(editor, editor_area);

                let mut status_bar = StatusBar::new(app.buffer())
                    .with_jump(app.jump_indicator())
                    .with_documents(app.current_index(), app.document_count())
                    .with_message(app.status_message());
                if app.show_quit_dialog() {
                    status_bar =
                        status_bar.with_warning("Unsaved changes! Press Y to quit, N to cancel");
                }
                f.render_widget(status_bar, main_chunks[1]);

                let cursor = app.buffer().position();
                let cursor_x = app.buffer().display_width_to_column(
                    cursor.line,
                    cursor.column,
                    editor_config.tab_width,
                ) as u16
                    + app.line_number_gutter_width();
                let cursor_y = cursor.line.saturating_sub(app.scroll_offset()) as u16;
                if cursor_y < editor_area.height {
                    f.set_cursor_position((editor_area.x + cursor_x, editor_area.y + cursor_y));
                }
            })
            .map_err(|e| miette::miette!("Failed to draw terminal: {}", e))?;

        // Handle input
        if event::poll(Duration::from_millis(100))
            .map_err(|e| miette::miette!("Failed to poll events: {}", e))?
        {
            match event::read().map_err(|e| miette::miette!("Failed to read event: {}", e))? {
                Event::Key(key) => app.handle_key(key)?,
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

fn check(config: Config, file: PathBuf, line: usize, column: usize, json: bool) -> Result<()> {
    let report = check_position(config, &file, line, column)?;

    if json {
        let output = serde_json::to_string_pretty(&report)
            .map_err(|e| miette::miette!("Failed to serialize report: {}", e))?;
        println!("{}", output);
    } else {
        println!("{}", report);
    }

    Ok(())
}

/// Initialize default configuration file
fn init_config(path: Option<PathBuf>) -> Result<()> {
    let config = Config::default();
    let config_path = path.unwrap_or_else(Config::default_config_path);

    if config_path.exists() {
        eprintln!("Config file already exists at: {}", config_path.display());
        eprintln!("Remove it first or edit it manually.");
        return Ok(());
    }

    config.save_to_file(&config_path)?;
    let keys = &config.keybindings;
    println!(
        "Created default config file at: {}\n\n\
         Default keybindings:\n\
         Jump out / advance:       {}\n\
         Toggle jump (document):   {}\n\
         Toggle jump (everywhere): {}\n\
         Next / previous document: {} / {}\n\
         Save:                     {}\n\
         Quit:                     {}\n\n\
         You can edit this file to customize keybindings and jump characters.",
        config_path.display(),
        keys.advance.display(),
        keys.toggle_jump.display(),
        keys.toggle_jump_global.display(),
        keys.next_document.display(),
        keys.previous_document.display(),
        keys.save.display(),
        keys.quit.display(),
    );

    Ok(())
}

/// List available syntax highlighting themes
fn list_themes() -> Result<()> {
    let themes = CodeRenderer::available_themes();
    let theme_list = themes
        .iter()
        .enumerate()
        .map(|(i, theme)| format!("  {}. {}", i + 1, theme))
        .collect::<Vec<_>>()
        .join("\n");

    println!(
        "Available syntax highlighting themes:\n\n\
         {}\n\n\
         To use a theme, add this to your config file:\n\
         [editor]\n\
         theme = \"base16-ocean.dark\"\n\n\
         Config file location: {}\n\
         Run 'tab-jump init-config' to create a default config file.",
        theme_list,
        Config::default_config_path().display()
    );

    Ok(())
}
