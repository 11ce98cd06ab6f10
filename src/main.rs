//! Vellum - a modal, scriptable console text editor
//! Main entry point

use anyhow::{Context, Result};
use vellum::editor::{Editor, EditorStatus};
use vellum::mode;
use vellum::screen;
use vellum::terminal::{self, RawTerminal};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter("VELLUM_LOG"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut commands: Vec<String> = Vec::new();
    let mut files: Vec<String> = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" => {
                let cmd = iter.next().context("-c requires an argument")?;
                commands.push(cmd);
            }
            "-V" | "--version" => {
                println!("vellum {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            _ => files.push(arg),
        }
    }

    let mut editor = Editor::with_defaults();

    // User config, when present
    let user_rc = format!("{}/rc", editor.home_dir);
    if let Ok(text) = std::fs::read_to_string(&user_rc) {
        vellum::config::exec_config(&mut editor, &user_rc, &text);
    }

    for file in &files {
        editor.open_file(std::path::Path::new(file));
    }
    for cmd in &commands {
        editor.handle_command(cmd, false);
    }
    if let EditorStatus::Quit(code) = editor.status {
        std::process::exit(code);
    }

    let term = RawTerminal::new().context("failed to enter raw mode")?;
    editor.interactive = true;

    loop {
        let (width, height) = term.size();
        if let Err(err) = screen::draw(&mut editor, width, height) {
            drop(term);
            return Err(err).context("draw failed");
        }

        match terminal::read_event() {
            Ok(Some(event)) => {
                editor.err.clear_msg();
                mode::handle_input(&mut editor, event);
            }
            Ok(None) => {} // resize; redraw
            Err(err) => {
                drop(term);
                return Err(err).context("input read failed");
            }
        }

        if let EditorStatus::Quit(code) = editor.status {
            drop(term);
            std::process::exit(code);
        }
    }
}
