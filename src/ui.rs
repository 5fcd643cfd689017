use crate::app::{update, AppMsg, Effect};
use crate::config::{ExplorerConfig, RefreshConfig};
use crate::model::ResourceNode;
use crate::nav::cursor::Cursor;
use crate::nav::flatten::TreeIndex;
use crate::nav::pane::Pane;
use crate::services::refresh::{spawn_refresh, CancelToken, RefreshMsg};
use crate::services::source::{open_source, TraceSource};
use crate::theme::Theme;
use crate::widgets::detail_viewer::DetailViewer;
use crate::widgets::status_bar::{draw_help, help_height, Flash, RefreshState, StatusBar};
use crate::widgets::tree_table::TreeTable;
use crate::widgets::Widget;
use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;
use crossterm::event::{self, Event, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const TICK_RATE: Duration = Duration::from_millis(200);
const INPUT_POLL: Duration = Duration::from_millis(100);
const HEADLESS_ENV: &str = "XTRACE_EXPLORER_HEADLESS";
const HEADLESS_TICKS_ENV: &str = "XTRACE_EXPLORER_TICKS";
const HEADLESS_SIZE: (u16, u16) = (120, 30);

/// Everything the shell owns. Only the UI thread ever touches it.
#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) index: TreeIndex,
    pub(crate) cursor: Cursor,
    pub(crate) pane: Pane,
    pub(crate) tree: TreeTable,
    pub(crate) detail: DetailViewer,
    pub(crate) status: StatusBar,
    pub(crate) theme: Theme,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) show_full_help: bool,
    pub(crate) tick: u64,
}

impl AppState {
    pub(crate) fn new(config: &ExplorerConfig) -> Self {
        let watch = config
            .refresh
            .enabled
            .then_some(config.refresh.interval);
        Self {
            status: StatusBar::new(config.path_separator.clone(), watch),
            ..Default::default()
        }
    }
}

/// Inbound queue of the shell. Fed by the terminal input thread and the
/// refresh thread.
pub(crate) enum ShellEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Refresh(RefreshMsg),
    Fatal(String),
}

impl ShellEvent {
    fn into_msg(self) -> Result<AppMsg> {
        Ok(match self {
            ShellEvent::Key(k) => AppMsg::Key(k),
            ShellEvent::Resize { width, height } => AppMsg::Resize { width, height },
            ShellEvent::Refresh(RefreshMsg::Loaded(forest)) => AppMsg::TreeLoaded(forest),
            ShellEvent::Refresh(RefreshMsg::Failed(e)) => AppMsg::FetchFailed(e),
            ShellEvent::Fatal(e) => return Err(anyhow!(e)),
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run(config: ExplorerConfig) -> Result<()> {
    let source = open_source(&config.source)?;
    info!(
        source = %source.describe(),
        watch = config.refresh.enabled,
        interval = ?config.refresh.interval,
        "starting trace session"
    );
    let (tx, rx) = mpsc::channel::<ShellEvent>();
    let cancel = CancelToken::new();
    start_refresh(source, tx.clone(), config.refresh, cancel.clone())?;

    let mut state = AppState::new(&config);
    let result = wait_for_first_tree(&rx).and_then(|forest| {
        update(&mut state, AppMsg::TreeLoaded(forest));
        if env_flag(HEADLESS_ENV) {
            let ticks = std::env::var(HEADLESS_TICKS_ENV)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(10);
            let summary = run_headless(&mut state, &rx, ticks)?;
            println!("{summary}");
            Ok(())
        } else {
            run_interactive(&mut state, &tx, &rx, &cancel)
        }
    });
    cancel.cancel();
    info!(ok = result.is_ok(), "trace session finished");
    result
}

fn start_refresh(
    mut source: Box<dyn TraceSource>,
    tx: Sender<ShellEvent>,
    config: RefreshConfig,
    cancel: CancelToken,
) -> Result<JoinHandle<()>> {
    let deliver_tx = tx.clone();
    spawn_refresh(
        move || source.fetch(),
        move |msg| deliver_tx.send(ShellEvent::Refresh(msg)).is_ok(),
        move |e| {
            let _ = tx.send(ShellEvent::Fatal(format!("{e:#}")));
        },
        config,
        cancel,
    )
    .context("spawning refresh thread")
}

/// Block until the initial fetch has either produced a tree or failed. Nothing
/// is drawn before this returns.
fn wait_for_first_tree(rx: &Receiver<ShellEvent>) -> Result<Vec<ResourceNode>> {
    loop {
        match rx.recv() {
            Ok(ShellEvent::Refresh(RefreshMsg::Loaded(forest))) => return Ok(forest),
            Ok(ShellEvent::Refresh(RefreshMsg::Failed(e))) | Ok(ShellEvent::Fatal(e)) => {
                return Err(anyhow!(e))
            }
            Ok(_) => continue,
            Err(_) => return Err(anyhow!("refresh stopped before delivering a trace")),
        }
    }
}

fn spawn_input_thread(tx: Sender<ShellEvent>, cancel: CancelToken) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("terminal-input".into())
        .spawn(move || {
            while !cancel.is_cancelled() {
                match event::poll(INPUT_POLL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        let _ = tx.send(ShellEvent::Fatal(format!("terminal input: {e}")));
                        break;
                    }
                }
                let ev = match event::read() {
                    Ok(Event::Key(k)) => ShellEvent::Key(k),
                    Ok(Event::Resize(width, height)) => ShellEvent::Resize { width, height },
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = tx.send(ShellEvent::Fatal(format!("terminal input: {e}")));
                        break;
                    }
                };
                if tx.send(ev).is_err() {
                    break;
                }
            }
            debug!("input thread stopped");
        })
        .context("spawning input thread")
}

fn run_interactive(
    state: &mut AppState,
    tx: &Sender<ShellEvent>,
    rx: &Receiver<ShellEvent>,
    cancel: &CancelToken,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = terminal.size().map_err(anyhow::Error::from).and_then(|size| {
        update(
            state,
            AppMsg::Resize {
                width: size.width,
                height: size.height,
            },
        );
        let input = spawn_input_thread(tx.clone(), cancel.clone())?;
        let mut clipboard = None;
        let res = event_loop(&mut terminal, state, rx, &mut clipboard);
        cancel.cancel();
        let _ = input.join();
        res
    });

    // Restore
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    rx: &Receiver<ShellEvent>,
    clipboard: &mut Option<Clipboard>,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, state))?;
        let msg = match rx.recv_timeout(TICK_RATE) {
            Ok(ev) => ev.into_msg()?,
            Err(RecvTimeoutError::Timeout) => AppMsg::Tick,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };
        let effects = update(state, msg);
        if run_effects(state, effects, clipboard) {
            return Ok(());
        }
    }
}

/// Apply side effects requested by `update`. Returns true when the session
/// should end.
fn run_effects(
    state: &mut AppState,
    effects: Vec<Effect>,
    clipboard: &mut Option<Clipboard>,
) -> bool {
    let mut quit = false;
    for eff in effects {
        match eff {
            Effect::Quit => quit = true,
            Effect::Yank(text) => match copy_to_clipboard(clipboard, &text) {
                Ok(()) => debug!(%text, "yanked"),
                Err(e) => {
                    warn!(error = %e, "clipboard unavailable");
                    state.status.flash(Flash::Error(format!("clipboard: {e}")));
                }
            },
        }
    }
    quit
}

fn copy_to_clipboard(slot: &mut Option<Clipboard>, text: &str) -> Result<(), arboard::Error> {
    if slot.is_none() {
        *slot = Some(Clipboard::new()?);
    }
    if let Some(cb) = slot.as_mut() {
        cb.set_text(text)?;
    }
    Ok(())
}

/// Drive the real update/draw cycle against an in-memory backend for up to
/// `ticks` frames and return a one-line JSON summary.
fn run_headless(
    state: &mut AppState,
    rx: &Receiver<ShellEvent>,
    ticks: u64,
) -> Result<serde_json::Value> {
    let (width, height) = HEADLESS_SIZE;
    let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(width, height))?;
    update(state, AppMsg::Resize { width, height });
    let mut clipboard = None;
    'ticks: for _ in 0..ticks {
        terminal.draw(|f| draw(f, state))?;
        while let Ok(ev) = rx.try_recv() {
            let effects = update(state, ev.into_msg()?);
            if run_effects(state, effects, &mut clipboard) {
                break 'ticks;
            }
        }
        update(state, AppMsg::Tick);
        thread::sleep(TICK_RATE);
    }
    Ok(headless_summary(state))
}

fn headless_summary(state: &AppState) -> serde_json::Value {
    let refresh_error = match state.status.refresh_state() {
        RefreshState::Failed(e) => Some(e.clone()),
        _ => None,
    };
    serde_json::json!({
        "rows": state.index.len(),
        "cursor": state.cursor.pos(),
        "pane": state.pane.label(),
        "path": state.status.path(),
        "refresh_error": refresh_error,
    })
}

pub(crate) fn draw(f: &mut Frame, state: &mut AppState) {
    let help_h = help_height(state.show_full_help, f.area().width);
    let [main, help, bar] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(help_h),
        Constraint::Length(1),
    ])
    .areas(f.area());

    match state.pane {
        Pane::Tree => state
            .tree
            .render(f, main, &state.index, &state.cursor, true, &state.theme),
        Pane::Detail => state.detail.render(f, main, true, &state.theme),
    }
    draw_help(f, help, state.show_full_help, &state.theme);
    state.status.render(f, bar, false, &state.theme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn nodes() -> Vec<ResourceNode> {
        vec![ResourceNode::new("XApp/demo").with_children(vec![ResourceNode::new("XDb/db")])]
    }

    #[test]
    fn first_tree_or_fatal_decides_startup() {
        let (tx, rx) = mpsc::channel();
        tx.send(ShellEvent::Resize {
            width: 1,
            height: 1,
        })
        .unwrap();
        tx.send(ShellEvent::Refresh(RefreshMsg::Loaded(nodes())))
            .unwrap();
        assert_eq!(wait_for_first_tree(&rx).unwrap().len(), 1);

        tx.send(ShellEvent::Fatal("exit status 1".into())).unwrap();
        let err = wait_for_first_tree(&rx).unwrap_err();
        assert!(err.to_string().contains("exit status 1"));

        drop(tx);
        assert!(wait_for_first_tree(&rx).is_err());
    }

    #[test]
    fn event_loop_quits_on_interrupt_and_errors_on_fatal() {
        use crossterm::event::{KeyCode, KeyModifiers};
        let mut state = AppState::default();
        update(&mut state, AppMsg::TreeLoaded(nodes()));
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();

        let (tx, rx) = mpsc::channel();
        tx.send(ShellEvent::Key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)))
            .unwrap();
        tx.send(ShellEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
        .unwrap();
        event_loop(&mut terminal, &mut state, &rx, &mut None).unwrap();
        assert_eq!(state.cursor.pos(), 1);

        tx.send(ShellEvent::Fatal("boom".into())).unwrap();
        let err = event_loop(&mut terminal, &mut state, &rx, &mut None).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn headless_run_stops_at_quit() {
        use crossterm::event::{KeyCode, KeyModifiers};
        let mut state = AppState::default();
        update(&mut state, AppMsg::TreeLoaded(nodes()));
        let (tx, rx) = mpsc::channel();
        tx.send(ShellEvent::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)))
            .unwrap();
        // queued behind the quit; must never be applied
        tx.send(ShellEvent::Key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)))
            .unwrap();
        let summary = run_headless(&mut state, &rx, 3).unwrap();
        assert_eq!(summary["cursor"], 0);
        assert_eq!(state.tick, 0);
        assert_eq!(summary["path"][0], "XApp/demo");
    }

    #[test]
    fn draw_shows_tree_help_and_breadcrumb() {
        let mut state = AppState::default();
        update(&mut state, AppMsg::TreeLoaded(nodes()));
        let mut terminal = Terminal::new(TestBackend::new(100, 10)).unwrap();
        terminal.draw(|f| draw(f, &mut state)).unwrap();
        let buf = terminal.backend().buffer();
        let text: String = (0..buf.area.height)
            .flat_map(|y| (0..buf.area.width).map(move |x| (x, y)))
            .map(|p| buf[p].symbol().to_string())
            .collect();
        assert!(text.contains("XApp/demo"));
        assert!(text.contains("└── XDb/db"));
        assert!(text.contains("enter details"));
        assert!(text.contains(" $ "));

        let summary = headless_summary(&state);
        assert_eq!(summary["rows"], 2);
        assert_eq!(summary["pane"], "tree");
        assert_eq!(summary["path"][0], "XApp/demo");
        assert!(summary["refresh_error"].is_null());
    }
}
