use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event};
use kl_base::config::KubeConfig;
use ratatui::prelude::*;
use tracing::{debug, error, info, warn};

use crate::app::events::{AppEvent, map_event};
use crate::app::fetch::{FetchDispatcher, FetchJob};
use crate::app::navigator::{Effect, Navigator};
use crate::app::startup::{self, Startup, StartupMode};
use crate::constants::TICK_MS;
use crate::ui;

pub struct App {
    kubeconfig: KubeConfig,
    navigator: Navigator,
    /// None until a context has been opened.
    dispatcher: Option<FetchDispatcher>,
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl App {
    /// Build the app from the startup decision. With a session already open the
    /// root listing is dispatched right away.
    pub fn new(startup: Startup, namespace: Option<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        let Startup { kubeconfig, mode } = startup;

        let (navigator, dispatcher) = match mode {
            StartupMode::Session { context, session } => {
                let (navigator, job) = Navigator::with_session(context, namespace);
                let dispatcher = FetchDispatcher::new(session, tx.clone());
                dispatcher.dispatch(job);
                (navigator, Some(dispatcher))
            }
            StartupMode::SelectContext { contexts, current } => {
                (Navigator::selecting(contexts, current.as_deref(), namespace), None)
            }
        };

        Self { kubeconfig, navigator, dispatcher, tx, rx }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        spawn_input_thread(self.tx.clone());
        terminal.draw(|frame| ui::render(frame, &self.navigator))?;

        while let Ok(event) = self.rx.recv() {
            if self.handle_event(event)? {
                info!("quit requested");
                break;
            }
            terminal.draw(|frame| ui::render(frame, &self.navigator))?;
        }
        Ok(())
    }

    /// Returns true when the app should exit.
    fn handle_event(&mut self, event: AppEvent) -> io::Result<bool> {
        match event {
            AppEvent::Input(event) => Ok(self.handle_input(&event)),
            AppEvent::Tick => {
                self.navigator.tick();
                Ok(false)
            }
            AppEvent::Fetched(outcome) => {
                debug!(?outcome, "fetch finished");
                self.navigator.apply(outcome);
                Ok(false)
            }
            AppEvent::InputLost(error) => Err(error),
        }
    }

    fn handle_input(&mut self, event: &Event) -> bool {
        let Some(input) = map_event(event, self.navigator.is_filtering()) else {
            return false;
        };

        match self.navigator.handle(input) {
            Effect::None => false,
            Effect::Quit => true,
            Effect::Fetch(job) => {
                self.dispatch(job);
                false
            }
            Effect::OpenContext(context) => {
                self.open_context(context);
                false
            }
        }
    }

    fn dispatch(&self, job: FetchJob) {
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.dispatch(job),
            None => warn!(?job, "no open session, fetch dropped"),
        }
    }

    fn open_context(&mut self, context: String) {
        match startup::open_session(&self.kubeconfig, &context) {
            Ok(session) => {
                info!(%context, "context opened");
                let job = self.navigator.context_opened(context);
                let dispatcher = FetchDispatcher::new(session, self.tx.clone());
                dispatcher.dispatch(job);
                self.dispatcher = Some(dispatcher);
            }
            Err(err) => {
                warn!(%context, error = %err, "could not open context");
                self.navigator.context_failed(err);
            }
        }
    }
}

/// Forward terminal events, emitting a tick whenever the poll times out.
fn spawn_input_thread(tx: Sender<AppEvent>) {
    thread::spawn(move || {
        loop {
            let event = match event::poll(Duration::from_millis(TICK_MS)) {
                Ok(true) => event::read().map(AppEvent::Input),
                Ok(false) => Ok(AppEvent::Tick),
                Err(err) => Err(err),
            };
            let event = event.unwrap_or_else(|err| {
                error!(error = %err, "terminal input failed");
                AppEvent::InputLost(err)
            });
            let lost = matches!(event, AppEvent::InputLost(_));
            if tx.send(event).is_err() || lost {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use kl_base::WorkspacePath;
    use kl_session::WorkspaceSession;
    use kl_session::fixture::FixtureConnector;

    use crate::app::navigator::Screen;

    const KUBECONFIG: &str = r#"
clusters:
- name: kcp
  cluster: {server: "https://kcp.example/clusters/root"}
contexts:
- name: a
  context: {cluster: kcp}
- name: broken
  context: {cluster: missing}
"#;

    fn kubeconfig() -> KubeConfig {
        KubeConfig::parse(KUBECONFIG, Path::new("/tmp/config")).unwrap()
    }

    fn key(c: char) -> AppEvent {
        AppEvent::Input(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
    }

    fn recv(app: &App) -> AppEvent {
        app.rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_session_start_dispatches_root_listing() {
        let fixture = FixtureConnector::new().with_workspaces("root", &["a"]);
        let session = WorkspaceSession::connect(Arc::new(fixture), "https://kcp/clusters/root").unwrap();
        let startup =
            Startup { kubeconfig: kubeconfig(), mode: StartupMode::Session { context: "a".into(), session } };
        let mut app = App::new(startup, None);
        assert!(app.navigator.is_loading());

        let event = recv(&app);
        assert!(!app.handle_event(event).unwrap());
        assert!(!app.navigator.is_loading());
        assert_eq!(app.navigator.current_path(), Some(&WorkspacePath::root()));
    }

    #[test]
    fn test_quit_key_exits() {
        let startup = Startup {
            kubeconfig: kubeconfig(),
            mode: StartupMode::SelectContext { contexts: vec!["a".into()], current: None },
        };
        let mut app = App::new(startup, None);
        assert!(app.handle_event(key('q')).unwrap());
    }

    #[test]
    fn test_failed_context_stays_on_selector() {
        let startup = Startup {
            kubeconfig: kubeconfig(),
            mode: StartupMode::SelectContext { contexts: vec!["a".into(), "broken".into()], current: None },
        };
        let mut app = App::new(startup, None);
        app.handle_event(key('j')).unwrap();
        app.handle_input(&Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));

        assert!(app.navigator.error().is_some());
        assert!(app.dispatcher.is_none());
        assert!(matches!(app.navigator.screen(), Screen::SelectingContext(_)));
    }

    #[test]
    fn test_input_loss_is_an_error() {
        let startup = Startup {
            kubeconfig: kubeconfig(),
            mode: StartupMode::SelectContext { contexts: vec!["a".into()], current: None },
        };
        let mut app = App::new(startup, None);
        let lost = AppEvent::InputLost(io::Error::other("tty closed"));
        assert!(app.handle_event(lost).is_err());
    }
}
