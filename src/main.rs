mod api;
mod config;
mod logging;
mod models;
mod ui;

use std::io;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::error;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::api::ProjectApi;
use crate::models::{NewProject, ProjectPatch};
use crate::ui::{
    project_wizard::{
        handle_input as handle_project_wizard_input, render_project_wizard, ProjectWizardAction,
        ProjectWizardState,
    },
    projects::{
        handle_input as handle_projects_input, render_projects, ProjectAction, ProjectsState,
    },
};

const FAILED_LOAD: &str = "Failed to load projects";
const FAILED_SEARCH: &str = "Failed to search projects";
const FAILED_DELETE: &str = "Failed to delete project";
const FAILED_CREATE: &str = "Failed to create project";
const FAILED_UPDATE: &str = "Failed to update project";

// Represents the current screen in the app
enum AppScreen {
    Projects,
    ProjectWizard,
}

// Main application state
struct AppState {
    api: ProjectApi,
    screen: AppScreen,
    projects_state: ProjectsState,
    project_wizard_state: Option<ProjectWizardState>,
}

impl AppState {
    fn new(api: ProjectApi) -> Self {
        Self {
            api,
            screen: AppScreen::Projects,
            projects_state: ProjectsState::new(),
            project_wizard_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init()?;
    logging::init()?;
    println!("Initializing project manager...");

    // Create the API client
    let api = ProjectApi::from_url(config.api_base_url())?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and fetch the initial collection
    let mut app_state = AppState::new(api);
    load_projects(&mut app_state).await;

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    println!("Thanks for using Project Manager!");

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Projects => {
                render_projects(f, &mut app_state.projects_state);
            }
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut app_state.project_wizard_state {
                    render_project_wizard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Projects => handle_projects_screen(app_state).await?,
            AppScreen::ProjectWizard => handle_project_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_projects(app_state: &mut AppState) {
    app_state.projects_state.begin_loading();
    match app_state.api.list().await {
        Ok(projects) => app_state.projects_state.finish_load(projects),
        Err(err) => {
            error!(error = %err, "loading projects failed");
            app_state.projects_state.fail(FAILED_LOAD);
        }
    }
}

async fn search_projects(app_state: &mut AppState, query: &str) {
    app_state.projects_state.begin_loading();
    match app_state.api.search(query).await {
        Ok(projects) => app_state.projects_state.finish_load(projects),
        Err(err) => {
            error!(error = %err, query, "searching projects failed");
            app_state.projects_state.fail(FAILED_SEARCH);
        }
    }
}

async fn handle_projects_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_projects_input(&mut app_state.projects_state)? {
        Some(ProjectAction::Exit) => {
            app_state.projects_state.cancel_pending();
            return Ok(true);
        }
        Some(ProjectAction::Reload) => {
            load_projects(app_state).await;
        }
        Some(ProjectAction::Search(query)) => {
            search_projects(app_state, &query).await;
        }
        Some(ProjectAction::DeleteProject(project_id)) => {
            app_state.projects_state.begin_loading();
            match app_state.api.delete(project_id).await {
                Ok(()) => app_state.projects_state.apply_delete(project_id),
                Err(err) => {
                    error!(error = %err, project_id, "deleting project failed");
                    app_state.projects_state.fail(FAILED_DELETE);
                }
            }
        }
        Some(ProjectAction::NewProject) => {
            // Leaving the list screen: drop any pending search timer
            app_state.projects_state.cancel_pending();
            app_state.project_wizard_state = Some(ProjectWizardState::new());
            app_state.screen = AppScreen::ProjectWizard;
        }
        Some(ProjectAction::EditProject(project)) => {
            // The form is pre-filled from the local snapshot
            app_state.projects_state.cancel_pending();
            app_state.project_wizard_state = Some(ProjectWizardState::from_existing(project));
            app_state.screen = AppScreen::ProjectWizard;
        }
        None => {}
    }

    Ok(false)
}

async fn handle_project_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.project_wizard_state {
        match handle_project_wizard_input(state)? {
            Some(ProjectWizardAction::Cancel) => {
                // Go back to the projects screen
                app_state.project_wizard_state = None;
                app_state.screen = AppScreen::Projects;
            }
            Some(ProjectWizardAction::Save(project)) => {
                if project.id == 0 {
                    // Create new project
                    let new_project = NewProject {
                        name: project.name,
                        description: project.description,
                    };
                    match app_state.api.create(&new_project).await {
                        Ok(created) => {
                            app_state.projects_state.apply_create(created);
                            app_state.project_wizard_state = None;
                            app_state.screen = AppScreen::Projects;
                        }
                        Err(err) => {
                            error!(error = %err, "creating project failed");
                            state.fail(FAILED_CREATE);
                        }
                    }
                } else {
                    // Update existing project
                    let patch = ProjectPatch {
                        name: Some(project.name),
                        description: Some(project.description),
                    };
                    match app_state.api.update(project.id, &patch).await {
                        Ok(updated) => {
                            app_state.projects_state.apply_update(updated);
                            app_state.project_wizard_state = None;
                            app_state.screen = AppScreen::Projects;
                        }
                        Err(err) => {
                            error!(error = %err, project_id = project.id, "updating project failed");
                            state.fail(FAILED_UPDATE);
                        }
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}
