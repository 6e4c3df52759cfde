//! The navigation state machine.
//!
//! Pure state: it never touches the session. Each input yields an [`Effect`]
//! for the event loop to carry out, and finished fetches come back through
//! [`Navigator::apply`].


use kl_base::{
    ApiRelationship, AvailableResourceType, GroupVersionResource, ResourceInstance, StartupError, SyncTarget,
    WorkspaceNode, WorkspacePath,
};
use tracing::debug;

use crate::app::events::Input;
use crate::app::fetch::{FetchJob, FetchOutcome, InstanceScope};
use crate::constants::{PAGE_SIZE, SPINNER_FRAMES};
use crate::error::AppError;
use crate::state::{DetailView, ListNav, ListView};

/// What the event loop must do after an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Fetch(FetchJob),
    OpenContext(String),
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct WorkspacesView {
    pub path: WorkspacePath,
    pub list: ListView<WorkspaceNode>,
}

impl WorkspacesView {
    fn at(path: WorkspacePath) -> Self {
        Self { path, list: ListView::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApisView {
    pub list: ListView<ApiRelationship>,
    /// Raw document of the selected relationship, when open.
    pub detail: Option<DetailView>,
}

#[derive(Debug, Clone)]
pub struct InstancesView {
    pub resource: GroupVersionResource,
    pub kind: String,
    pub scope: InstanceScope,
    pub list: ListView<ResourceInstance>,
}

/// One variant per screen, each carrying only its own data. Screens reached
/// from the workspace list keep that list as `parent` so `back` needs no fetch.
#[derive(Debug, Clone)]
pub enum Screen {
    SelectingContext(ListView<String>),
    Workspaces(WorkspacesView),
    Apis { parent: WorkspacesView, view: ApisView },
    SyncTargets { parent: WorkspacesView, list: ListView<SyncTarget> },
    ResourceTypes { parent: WorkspacesView, list: ListView<AvailableResourceType> },
    ResourceInstances { parent: WorkspacesView, types: ListView<AvailableResourceType>, view: InstancesView },
}

pub struct Navigator {
    screen: Screen,
    history: Vec<WorkspacePath>,
    /// History entry popped by a `back` whose listing is still in flight.
    returning_to: Option<WorkspacePath>,
    loading: bool,
    error: Option<AppError>,
    namespace: Option<String>,
    context: Option<String>,
    spinner: usize,
}

impl Navigator {
    /// Start on the root workspace of an open session. The returned job lists its children.
    pub fn with_session(context: impl Into<String>, namespace: Option<String>) -> (Self, FetchJob) {
        let mut nav = Self::blank(Screen::Workspaces(WorkspacesView::default()), namespace);
        let job = nav.context_opened(context);
        (nav, job)
    }

    /// Start on the context selector, highlighting `current` if given.
    pub fn selecting(contexts: Vec<String>, current: Option<&str>, namespace: Option<String>) -> Self {
        let mut list = ListView::new(contexts);
        if let Some(current) = current {
            list.select_where(|name| name == current);
        }
        Self::blank(Screen::SelectingContext(list), namespace)
    }

    fn blank(screen: Screen, namespace: Option<String>) -> Self {
        Self {
            screen,
            history: Vec::new(),
            returning_to: None,
            loading: false,
            error: None,
            namespace,
            context: None,
            spinner: 0,
        }
    }

    // === Read accessors ===

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn history(&self) -> &[WorkspacePath] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner % SPINNER_FRAMES.len()]
    }

    /// Workspace the visible data belongs to. None on the context selector.
    pub fn current_path(&self) -> Option<&WorkspacePath> {
        match &self.screen {
            Screen::SelectingContext(_) => None,
            Screen::Workspaces(view) => Some(&view.path),
            Screen::Apis { parent, .. }
            | Screen::SyncTargets { parent, .. }
            | Screen::ResourceTypes { parent, .. }
            | Screen::ResourceInstances { parent, .. } => Some(&parent.path),
        }
    }

    /// Whether printable keys currently edit a list filter.
    pub fn is_filtering(&self) -> bool {
        match &self.screen {
            Screen::SelectingContext(list) => list.is_filtering(),
            Screen::Workspaces(view) => view.list.is_filtering(),
            Screen::Apis { view, .. } => view.detail.is_none() && view.list.is_filtering(),
            Screen::SyncTargets { list, .. } => list.is_filtering(),
            Screen::ResourceTypes { list, .. } => list.is_filtering(),
            Screen::ResourceInstances { view, .. } => view.list.is_filtering(),
        }
    }

    // === Event loop hooks ===

    pub fn tick(&mut self) {
        if self.loading {
            self.spinner = self.spinner.wrapping_add(1);
        }
    }

    /// A context picked in the selector has a session now.
    pub fn context_opened(&mut self, context: impl Into<String>) -> FetchJob {
        let context = context.into();
        debug!(%context, "context opened");
        self.context = Some(context);
        self.screen = Screen::Workspaces(WorkspacesView::at(WorkspacePath::root()));
        self.history.clear();
        self.returning_to = None;
        self.error = None;
        self.loading = true;
        FetchJob::Workspaces { path: WorkspacePath::root() }
    }

    /// Opening the picked context failed; the selector stays up with the error shown.
    pub fn context_failed(&mut self, error: StartupError) {
        self.loading = false;
        self.error = Some(AppError::Startup(error));
    }

    /// Feed one input. While loading only `Quit` is honoured; while an
    /// error is shown only `Quit` and `Back`.
    pub fn handle(&mut self, input: Input) -> Effect {
        if input == Input::Quit {
            return Effect::Quit;
        }
        if self.loading {
            return Effect::None;
        }
        if self.error.is_some() {
            return if input == Input::Back { self.recover() } else { Effect::None };
        }

        match input {
            Input::Up => self.move_selection(-1),
            Input::Down => self.move_selection(1),
            Input::PageUp => self.move_selection(-(PAGE_SIZE as isize)),
            Input::PageDown => self.move_selection(PAGE_SIZE as isize),
            Input::Home => self.with_active(|list| list.select_first(), DetailView::scroll_home),
            Input::End => self.with_active(|list| list.select_last(), DetailView::scroll_end),
            Input::StartFilter => self.with_list(|list| list.start_filter()),
            Input::FilterChar(c) => self.with_list(|list| list.push_filter(c)),
            Input::FilterBackspace => self.with_list(|list| list.pop_filter()),
            Input::FilterAccept => self.with_list(|list| list.accept_filter()),
            Input::FilterCancel => self.with_list(|list| list.clear_filter()),
            Input::Confirm => self.confirm(),
            Input::Back => self.back(),
            Input::ShowApis => self.leave_workspaces(Target::Apis),
            Input::ShowSyncTargets => self.leave_workspaces(Target::SyncTargets),
            Input::ShowResourceTypes => self.leave_workspaces(Target::ResourceTypes),
            Input::ShowRawDocument => self.show_raw_document(),
            Input::AllWorkspaces => self.open_instances(true),
            Input::Quit => Effect::Quit,
        }
    }

    /// Take a finished fetch into whichever screen holds that kind of list.
    /// A result with no such screen on display is dropped.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        self.loading = false;
        let returning_to = self.returning_to.take();

        match (outcome, &mut self.screen) {
            (FetchOutcome::Failed { error }, _) => {
                // The failed back is retried on recovery.
                if let Some(path) = returning_to {
                    self.history.push(path);
                }
                self.error = Some(AppError::Fetch(error));
            }
            (FetchOutcome::WorkspacesLoaded { path, nodes }, Screen::Workspaces(view)) => {
                view.path = path;
                view.list = ListView::new(nodes);
            }
            (FetchOutcome::ApisLoaded { path, relationships }, Screen::Apis { parent, view }) => {
                note_late(&path, &parent.path);
                *view = ApisView { list: ListView::new(relationships), detail: None };
            }
            (FetchOutcome::SyncTargetsLoaded { path, targets }, Screen::SyncTargets { parent, list }) => {
                note_late(&path, &parent.path);
                *list = ListView::new(targets);
            }
            (FetchOutcome::AvailableResourceTypesLoaded { path, types }, Screen::ResourceTypes { parent, list }) => {
                note_late(&path, &parent.path);
                *list = ListView::new(types);
            }
            (
                FetchOutcome::ResourceInstancesLoaded { resource, scope, instances },
                Screen::ResourceInstances { view, .. },
            ) => {
                if view.resource != resource || view.scope != scope {
                    debug!(%resource, ?scope, "instances arrived for another listing");
                }
                view.list = ListView::new(instances);
            }
            (outcome, _) => debug!(?outcome, "no screen shows this result"),
        }
    }

    // === Transitions ===

    fn fetch(&mut self, job: FetchJob) -> Effect {
        self.loading = true;
        Effect::Fetch(job)
    }

    fn confirm(&mut self) -> Effect {
        match &mut self.screen {
            Screen::SelectingContext(list) => match list.selected_item() {
                Some(name) => Effect::OpenContext(name.clone()),
                None => Effect::None,
            },
            Screen::Workspaces(view) => {
                let Some(node) = view.list.selected_item() else {
                    return Effect::None;
                };
                let target = node.path.clone();
                self.history.push(view.path.clone());
                self.fetch(FetchJob::Workspaces { path: target })
            }
            Screen::Apis { .. } => self.show_raw_document(),
            Screen::ResourceTypes { .. } => self.open_instances(false),
            Screen::SyncTargets { .. } | Screen::ResourceInstances { .. } => Effect::None,
        }
    }

    fn back(&mut self) -> Effect {
        let screen = std::mem::replace(&mut self.screen, Screen::Workspaces(WorkspacesView::default()));
        let (screen, effect) = match screen {
            Screen::Apis { parent, view: ApisView { list, detail: Some(_) } } => {
                (Screen::Apis { parent, view: ApisView { list, detail: None } }, Effect::None)
            }
            Screen::Apis { parent, .. } | Screen::SyncTargets { parent, .. } | Screen::ResourceTypes { parent, .. } => {
                (Screen::Workspaces(parent), Effect::None)
            }
            Screen::ResourceInstances { parent, types, .. } => {
                (Screen::ResourceTypes { parent, list: types }, Effect::None)
            }
            Screen::Workspaces(view) => match self.history.pop() {
                Some(previous) => {
                    self.returning_to = Some(previous.clone());
                    (Screen::Workspaces(view), self.fetch(FetchJob::Workspaces { path: previous }))
                }
                None => (Screen::Workspaces(view), Effect::None),
            },
            selecting @ Screen::SelectingContext(_) => (selecting, Effect::None),
        };
        self.screen = screen;
        effect
    }

    /// Clear the error and re-list whatever the screen being returned to shows.
    fn recover(&mut self) -> Effect {
        self.error = None;

        let screen = std::mem::replace(&mut self.screen, Screen::Workspaces(WorkspacesView::default()));
        let (screen, job) = match screen {
            selecting @ Screen::SelectingContext(_) => (selecting, None),
            Screen::Workspaces(view) => {
                let path = match self.history.pop() {
                    Some(previous) => {
                        self.returning_to = Some(previous.clone());
                        previous
                    }
                    None => view.path.clone(),
                };
                (Screen::Workspaces(view), Some(FetchJob::Workspaces { path }))
            }
            Screen::Apis { parent, .. } | Screen::SyncTargets { parent, .. } | Screen::ResourceTypes { parent, .. } => {
                let job = FetchJob::Workspaces { path: parent.path.clone() };
                (Screen::Workspaces(parent), Some(job))
            }
            Screen::ResourceInstances { parent, types, .. } => {
                let job = FetchJob::ResourceTypes { path: parent.path.clone() };
                (Screen::ResourceTypes { parent, list: types }, Some(job))
            }
        };
        self.screen = screen;

        match job {
            Some(job) => self.fetch(job),
            None => Effect::None,
        }
    }

    fn leave_workspaces(&mut self, target: Target) -> Effect {
        let Screen::Workspaces(view) = &self.screen else {
            return Effect::None;
        };
        let parent = view.clone();
        let path = parent.path.clone();

        let (screen, job) = match target {
            Target::Apis => (Screen::Apis { parent, view: ApisView::default() }, FetchJob::Apis { path }),
            Target::SyncTargets => {
                (Screen::SyncTargets { parent, list: ListView::default() }, FetchJob::SyncTargets { path })
            }
            Target::ResourceTypes => {
                (Screen::ResourceTypes { parent, list: ListView::default() }, FetchJob::ResourceTypes { path })
            }
        };
        self.screen = screen;
        self.fetch(job)
    }

    fn open_instances(&mut self, all_workspaces: bool) -> Effect {
        let Screen::ResourceTypes { parent, list } = &self.screen else {
            return Effect::None;
        };
        let Some(selected) = list.selected_item() else {
            return Effect::None;
        };

        let resource = selected.resource.clone();
        let (scope, job) = if all_workspaces {
            (InstanceScope::AllWorkspaces, FetchJob::InstancesAcrossWorkspaces { resource: resource.clone() })
        } else {
            let namespace = if selected.namespaced { self.namespace.clone() } else { None };
            let path = parent.path.clone();
            (
                InstanceScope::Workspace(path.clone()),
                FetchJob::Instances { path, resource: resource.clone(), namespace },
            )
        };

        let view = InstancesView { resource, kind: selected.kind.clone(), scope, list: ListView::default() };
        self.screen = Screen::ResourceInstances { parent: parent.clone(), types: list.clone(), view };
        self.fetch(job)
    }

    fn show_raw_document(&mut self) -> Effect {
        if let Screen::Apis { view, .. } = &mut self.screen
            && view.detail.is_none()
            && let Some(rel) = view.list.selected_item()
        {
            let title = format!("{} {}", rel.kind_label(), rel.name);
            view.detail = Some(DetailView::from_document(title, &rel.raw));
        }
        Effect::None
    }

    // === List plumbing ===

    fn active_list(&mut self) -> Option<&mut dyn ListNav> {
        match &mut self.screen {
            Screen::SelectingContext(list) => Some(list),
            Screen::Workspaces(view) => Some(&mut view.list),
            Screen::Apis { view, .. } if view.detail.is_none() => Some(&mut view.list),
            Screen::Apis { .. } => None,
            Screen::SyncTargets { list, .. } => Some(list),
            Screen::ResourceTypes { list, .. } => Some(list),
            Screen::ResourceInstances { view, .. } => Some(&mut view.list),
        }
    }

    fn active_detail(&mut self) -> Option<&mut DetailView> {
        match &mut self.screen {
            Screen::Apis { view, .. } => view.detail.as_mut(),
            _ => None,
        }
    }

    fn with_list(&mut self, f: impl FnOnce(&mut dyn ListNav)) -> Effect {
        if let Some(list) = self.active_list() {
            f(list);
        }
        Effect::None
    }

    /// Apply to the open detail view if any, otherwise to the active list.
    fn with_active(&mut self, on_list: impl FnOnce(&mut dyn ListNav), on_detail: fn(&mut DetailView)) -> Effect {
        if let Some(detail) = self.active_detail() {
            on_detail(detail);
            return Effect::None;
        }
        self.with_list(on_list)
    }

    fn move_selection(&mut self, delta: isize) -> Effect {
        if let Some(detail) = self.active_detail() {
            detail.scroll_by(delta);
            return Effect::None;
        }
        self.with_list(|list| list.move_by(delta))
    }
}

fn note_late(fetched: &WorkspacePath, shown: &WorkspacePath) {
    if fetched != shown {
        debug!(%fetched, %shown, "result arrived for another workspace");
    }
}

enum Target {
    Apis,
    SyncTargets,
    ResourceTypes,
}
