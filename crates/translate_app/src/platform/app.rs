use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use client_logging::{client_info, client_warn};
use translate_core::{update, AppState, AppViewModel, Msg};
use translate_engine::{ensure_output_dir, EngineHandle};

use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::ui::commands::{self, Command, HELP_LINES};
use super::{config, ui};
use crate::Args;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

/// Input from the stdin reader that the state machine does not handle.
enum Control {
    Help,
    Languages,
    Invalid(String),
    Quit,
}

pub fn run_app(args: Args) -> anyhow::Result<()> {
    logging::initialize(
        LogDestination::from_flags(args.log_to_terminal),
        &args.log_file,
        client_logging::level_for(args.verbose),
    );

    let loaded = config::load(&args.config)?.resolve(args.server.as_deref())?;
    ensure_output_dir(&loaded.engine.api.download_dir).with_context(|| {
        format!(
            "failed to create download directory {}",
            loaded.engine.api.download_dir.display()
        )
    })?;
    client_info!("Connecting to {}", loaded.engine.api.base_url);

    let engine = EngineHandle::new(loaded.engine).context("failed to start the engine")?;
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let (control_tx, control_rx) = mpsc::channel::<Control>();
    let runner = EffectRunner::new(engine, msg_tx.clone());

    spawn_stdin_reader(msg_tx.clone(), control_tx);

    // Background tick so control input is noticed without engine traffic.
    thread::spawn(move || {
        while msg_tx.send(Msg::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    let mut app = App::new(AppState::new(loaded.client), runner);
    app.draw()?;
    for msg in msg_rx {
        while let Ok(control) = control_rx.try_recv() {
            if !app.handle_control(control)? {
                client_info!("Quit requested");
                return Ok(());
            }
        }
        app.dispatch_msg(msg)?;
    }
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    clear_screen: bool,
}

impl App {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            clear_screen: io::stdout().is_terminal(),
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
        if self.state.consume_dirty() {
            self.draw()?;
        }
        Ok(())
    }

    /// Returns false once the user asked to quit.
    fn handle_control(&mut self, control: Control) -> io::Result<bool> {
        let view = self.state.view();
        let lines: Vec<String> = match control {
            Control::Quit => return Ok(false),
            Control::Help => HELP_LINES.iter().map(|line| line.to_string()).collect(),
            Control::Languages => language_lines(&view),
            Control::Invalid(message) => vec![message],
        };
        let mut out = io::stdout().lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        write!(out, "> ")?;
        out.flush()?;
        Ok(true)
    }

    fn draw(&self) -> io::Result<()> {
        let view = self.state.view();
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let mut out = io::stdout().lock();
        if self.clear_screen {
            write!(out, "\x1b[2J\x1b[H")?;
        }
        for line in ui::render::render(&view, &timestamp) {
            writeln!(out, "{line}")?;
        }
        write!(out, "> ")?;
        out.flush()
    }
}

fn language_lines(view: &AppViewModel) -> Vec<String> {
    view.languages
        .iter()
        .map(|language| {
            let marker = if language.code == view.target_language {
                '*'
            } else {
                ' '
            };
            format!("{marker} {:<8} {}", language.code, language.name)
        })
        .collect()
}

fn spawn_stdin_reader(msg_tx: mpsc::Sender<Msg>, control_tx: mpsc::Sender<Control>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    client_warn!("stdin read failed: {}", err);
                    break;
                }
            };
            let sent = match commands::parse(&line) {
                Ok(Some(Command::Dispatch(msg))) => msg_tx.send(msg).is_ok(),
                Ok(Some(Command::Help)) => control_tx.send(Control::Help).is_ok(),
                Ok(Some(Command::Languages)) => control_tx.send(Control::Languages).is_ok(),
                Ok(Some(Command::Quit)) => {
                    let _ = control_tx.send(Control::Quit);
                    return;
                }
                Ok(None) => true,
                Err(message) => control_tx.send(Control::Invalid(message)).is_ok(),
            };
            if !sent {
                return;
            }
        }
        let _ = control_tx.send(Control::Quit);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use translate_core::ClientSettings;

    #[test]
    fn current_language_is_marked() {
        let view = AppState::new(ClientSettings::default()).view();
        let lines = language_lines(&view);
        assert_eq!(lines[0], "* ko       Korean");
        assert_eq!(lines[1], "  en       English");
        assert_eq!(lines.len(), 4);
    }
}
