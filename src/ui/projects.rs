use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tracing::debug;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::Project;
use crate::ui::debounce::{Debounce, SearchTrigger};

// How long the event loop waits for a key before re-checking the debounce
// deadline and redrawing.
const INPUT_TICK: Duration = Duration::from_millis(100);

// Represents the state of the project list screen
pub struct ProjectsState {
    projects: Vec<Project>,
    list_state: ListState,
    search_query: String,
    search_focused: bool,
    loading: bool,
    error: Option<String>,
    debounce: Debounce,
}

impl ProjectsState {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
            list_state: ListState::default(),
            search_query: String::new(),
            search_focused: false,
            loading: false,
            error: None,
            debounce: Debounce::new(),
        }
    }

    pub fn next(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.projects.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.projects.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.list_state.selected().and_then(|i| self.projects.get(i))
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    // State transitions for the request lifecycle. The collection is only
    // ever mutated by these success/failure handlers.

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    /// Replace the snapshot with a fresh list/search result.
    pub fn finish_load(&mut self, projects: Vec<Project>) {
        debug!(count = projects.len(), "replacing project snapshot");
        self.projects = projects;
        self.loading = false;
        self.error = None;

        let selected = self
            .list_state
            .selected()
            .filter(|i| *i < self.projects.len());
        if selected.is_none() && !self.projects.is_empty() {
            self.list_state.select(Some(0));
        } else {
            self.list_state.select(selected);
        }
    }

    /// Splice a freshly created project into the snapshot. The remote side
    /// owns ids, so an id we already hold means the entry is replaced
    /// rather than duplicated.
    pub fn apply_create(&mut self, project: Project) {
        debug!(id = project.id, "created project");
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project,
            None => self.projects.push(project),
        }
        self.loading = false;
        self.error = None;
        if self.list_state.selected().is_none() {
            self.list_state.select(Some(0));
        }
    }

    /// Replace the entry matching the updated project's id.
    pub fn apply_update(&mut self, project: Project) {
        debug!(id = project.id, "updated project");
        if let Some(existing) = self.projects.iter_mut().find(|p| p.id == project.id) {
            *existing = project;
        }
        self.loading = false;
        self.error = None;
    }

    /// Remove the entry with the given id.
    pub fn apply_delete(&mut self, id: i64) {
        debug!(id, "deleted project");
        self.projects.retain(|p| p.id != id);
        self.loading = false;
        self.error = None;

        match self.list_state.selected() {
            Some(_) if self.projects.is_empty() => self.list_state.select(None),
            Some(i) if i >= self.projects.len() => {
                self.list_state.select(Some(self.projects.len() - 1))
            }
            _ => {}
        }
    }

    /// Record a failed action. The prior snapshot stays visible.
    pub fn fail(&mut self, message: &str) {
        self.loading = false;
        self.error = Some(message.to_string());
    }

    /// Cancel the pending debounce slot and force-clear the loading flag.
    /// Called when the screen is left so no stale timer or spinner survives.
    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
        self.loading = false;
    }

    pub fn focus_search(&mut self) {
        self.search_focused = true;
    }

    pub fn blur_search(&mut self) {
        self.search_focused = false;
    }

    pub fn search_focused(&self) -> bool {
        self.search_focused
    }

    fn push_search_char(&mut self, c: char, now: Instant) {
        self.search_query.push(c);
        self.debounce.schedule(&self.search_query, now);
    }

    fn pop_search_char(&mut self, now: Instant) {
        self.search_query.pop();
        self.debounce.schedule(&self.search_query, now);
    }

    fn take_due_search(&mut self, now: Instant) -> Option<SearchTrigger> {
        self.debounce.fire_if_due(now)
    }
}

pub enum ProjectAction {
    Exit,
    NewProject,
    EditProject(Project),
    DeleteProject(i64), // Contains project_id
    Reload,
    Search(String), // Contains the settled query
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    // Create the layout
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    // Search box
    let search_text = if state.search_focused {
        format!("{}|", state.search_query)
    } else {
        state.search_query.clone()
    };
    let search_style = if state.search_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search_box = Paragraph::new(search_text)
        .style(search_style)
        .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(search_box, chunks[0]);

    // Status banner: an error stays up until the next successful action
    let banner = if let Some(error) = state.error() {
        Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red))
    } else if state.is_loading() {
        Paragraph::new("Loading...").style(Style::default().fg(Color::Gray))
    } else {
        Paragraph::new("")
    };
    frame.render_widget(banner, chunks[1]);

    // Create and render the projects list
    let items: Vec<ListItem> = state
        .projects
        .iter()
        .map(|project| {
            ListItem::new(Spans::from(vec![
                Span::styled(
                    project.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    project.description.clone(),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let projects_list = List::new(items)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(projects_list, chunks[2], &mut state.list_state);

    // Create and render the buttons
    let buttons_text = if state.search_focused {
        "<Enter>/<Esc> Leave Search".to_string()
    } else if state.selected_project().is_some() {
        "<N> New Project | <E> Edit Project | <D> Delete Project | </> Search | <Esc> Quit"
            .to_string()
    } else {
        "<N> New Project | </> Search | <Esc> Quit".to_string()
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[3]);
}

pub fn handle_input(state: &mut ProjectsState) -> Result<Option<ProjectAction>> {
    if event::poll(INPUT_TICK)? {
        if let Event::Key(key) = event::read()? {
            if state.search_focused() {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => {
                        state.blur_search();
                    }
                    KeyCode::Char(c) => {
                        state.push_search_char(c, Instant::now());
                    }
                    KeyCode::Backspace => {
                        state.pop_search_char(Instant::now());
                    }
                    _ => {}
                }
            } else {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        return Ok(Some(ProjectAction::Exit));
                    }
                    KeyCode::Char('/') => {
                        state.focus_search();
                    }
                    KeyCode::Char('n') => {
                        return Ok(Some(ProjectAction::NewProject));
                    }
                    KeyCode::Char('e') => {
                        if let Some(project) = state.selected_project() {
                            return Ok(Some(ProjectAction::EditProject(project.clone())));
                        }
                    }
                    KeyCode::Char('d') => {
                        if let Some(project) = state.selected_project() {
                            return Ok(Some(ProjectAction::DeleteProject(project.id)));
                        }
                    }
                    KeyCode::Down => {
                        state.next();
                    }
                    KeyCode::Up => {
                        state.previous();
                    }
                    _ => {}
                }
            }
        }
    }

    // The quiet period restarts on every keystroke, so the slot is only
    // consulted once input has drained.
    if let Some(trigger) = state.take_due_search(Instant::now()) {
        return Ok(Some(match trigger {
            SearchTrigger::Load => ProjectAction::Reload,
            SearchTrigger::Search(query) => ProjectAction::Search(query),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i64, name: &str, description: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn finish_load_replaces_snapshot_and_clears_error() {
        let mut state = ProjectsState::new();
        state.fail("Failed to load projects");

        state.begin_loading();
        state.finish_load(vec![project(1, "A", "d")]);

        assert_eq!(state.projects(), &[project(1, "A", "d")]);
        assert_eq!(state.error(), None);
        assert!(!state.is_loading());
        assert_eq!(state.selected_project(), Some(&project(1, "A", "d")));
    }

    #[test]
    fn failed_load_keeps_prior_snapshot() {
        let mut state = ProjectsState::new();
        state.finish_load(vec![project(1, "A", "d")]);

        state.begin_loading();
        state.fail("Failed to load projects");

        assert_eq!(state.projects(), &[project(1, "A", "d")]);
        assert_eq!(state.error(), Some("Failed to load projects"));
        assert!(!state.is_loading());
    }

    #[test]
    fn apply_create_appends_the_new_entry() {
        let mut state = ProjectsState::new();
        state.finish_load(vec![project(1, "A", "d")]);

        state.apply_create(project(2, "B", "e"));

        assert_eq!(
            state.projects(),
            &[project(1, "A", "d"), project(2, "B", "e")]
        );
        assert_eq!(state.error(), None);
    }

    #[test]
    fn apply_create_never_duplicates_an_id() {
        let mut state = ProjectsState::new();
        state.finish_load(vec![project(1, "A", "d")]);

        state.apply_create(project(1, "A2", "d2"));

        assert_eq!(state.projects(), &[project(1, "A2", "d2")]);
    }

    #[test]
    fn apply_update_replaces_by_id() {
        let mut state = ProjectsState::new();
        state.finish_load(vec![project(1, "A", "d"), project(2, "B", "e")]);

        state.apply_update(project(2, "B2", "e2"));

        assert_eq!(
            state.projects(),
            &[project(1, "A", "d"), project(2, "B2", "e2")]
        );
    }

    #[test]
    fn apply_delete_removes_by_id_and_fixes_cursor() {
        let mut state = ProjectsState::new();
        state.finish_load(vec![project(1, "A", "d"), project(2, "B", "e")]);
        state.next();

        state.apply_delete(2);

        assert_eq!(state.projects(), &[project(1, "A", "d")]);
        assert_eq!(state.selected_project(), Some(&project(1, "A", "d")));

        state.apply_delete(1);
        assert!(state.projects().is_empty());
        assert_eq!(state.selected_project(), None);
    }

    #[test]
    fn failed_delete_leaves_collection_unchanged() {
        let mut state = ProjectsState::new();
        state.finish_load(vec![project(1, "A", "d")]);
        state.apply_delete(1);
        assert!(state.projects().is_empty());

        // A second delete on the already-removed id fails remotely; the
        // container only records the generic error.
        state.fail("Failed to delete project");
        assert!(state.projects().is_empty());
        assert_eq!(state.error(), Some("Failed to delete project"));
    }

    #[test]
    fn typing_arms_the_debounce_and_blank_query_reloads() {
        let mut state = ProjectsState::new();
        let start = Instant::now();

        state.focus_search();
        state.push_search_char('a', start);
        state.push_search_char('b', start + Duration::from_millis(50));

        // Only the final value fires, once the quiet period has elapsed.
        assert_eq!(
            state.take_due_search(start + Duration::from_millis(200)),
            None
        );
        assert_eq!(
            state.take_due_search(start + Duration::from_millis(350)),
            Some(SearchTrigger::Search("ab".to_string()))
        );

        // Deleting back to empty settles into a full reload, never a search.
        state.pop_search_char(start + Duration::from_millis(400));
        state.pop_search_char(start + Duration::from_millis(450));
        assert_eq!(state.search_query(), "");
        assert_eq!(
            state.take_due_search(start + Duration::from_millis(750)),
            Some(SearchTrigger::Load)
        );
    }

    #[test]
    fn cancel_pending_clears_timer_and_loading_flag() {
        let mut state = ProjectsState::new();
        let start = Instant::now();

        state.begin_loading();
        state.focus_search();
        state.push_search_char('a', start);

        state.cancel_pending();

        assert!(!state.is_loading());
        assert_eq!(state.take_due_search(start + Duration::from_secs(1)), None);
    }
}
