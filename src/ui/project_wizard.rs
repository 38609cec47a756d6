use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::Project;

pub enum ProjectWizardAction {
    Cancel,
    Save(Project),
}

#[derive(Clone, PartialEq, Copy)]
pub enum ProjectField {
    Name,
    Description,
}

pub struct ProjectWizardState {
    pub project: Project,
    pub current_field: ProjectField,
    pub editing: bool,
    error: Option<String>,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        Self {
            project: Project {
                id: 0,
                name: String::new(),
                description: String::new(),
            },
            current_field: ProjectField::Name,
            editing: false,
            error: None,
        }
    }

    pub fn from_existing(project: Project) -> Self {
        Self {
            project,
            current_field: ProjectField::Name,
            editing: false,
            error: None,
        }
    }

    pub fn is_editing_existing(&self) -> bool {
        self.project.id != 0
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Name => ProjectField::Description,
            ProjectField::Description => ProjectField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Name => ProjectField::Description,
            ProjectField::Description => ProjectField::Name,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field = match self.current_field {
            ProjectField::Name => &mut self.project.name,
            ProjectField::Description => &mut self.project.description,
        };

        match key {
            KeyCode::Char(c) => {
                field.push(c);
            }
            KeyCode::Backspace => {
                field.pop();
            }
            _ => {}
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.project.name.is_empty()
    }

    /// Record a failed save. The wizard stays open with the form intact.
    pub fn fail(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    // Title with appropriate text based on whether we're editing or creating
    let title_text = if state.is_editing_existing() {
        "Project Editing Wizard"
    } else {
        "Project Creation Wizard"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Form fields
    let form_area = chunks[1];
    render_form(f, state, form_area);

    // A failed save leaves the form open with the error shown inline
    if let Some(error) = state.error() {
        let error_line =
            Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red));
        f.render_widget(error_line, chunks[2]);
    }

    // Help text
    let help_text = if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState, area: Rect) {
    let field_names = ["Name", "Description"];

    let field_values = [state.project.name.clone(), state.project.description.clone()];

    let items: Vec<ListItem> = field_names
        .iter()
        .zip(field_values.iter())
        .enumerate()
        .map(|(i, (name, value))| {
            let content = if i == state.current_field as usize && state.editing {
                Spans::from(vec![
                    Span::styled(
                        format!("{}: ", name),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        format!("{}|", value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if i == state.current_field as usize {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Spans::from(vec![
                    Span::styled(format!("{}: ", name), style),
                    Span::raw(value),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(ProjectWizardAction::Cancel));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('s') if !state.editing => {
                if state.is_valid() {
                    return Ok(Some(ProjectWizardAction::Save(state.project.clone())));
                }
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wizard_starts_blank() {
        let state = ProjectWizardState::new();
        assert_eq!(state.project.id, 0);
        assert!(state.project.name.is_empty());
        assert!(state.project.description.is_empty());
        assert!(!state.is_editing_existing());
        assert!(!state.is_valid());
    }

    #[test]
    fn existing_project_prefills_the_form() {
        let state = ProjectWizardState::from_existing(Project {
            id: 3,
            name: "A".to_string(),
            description: "d".to_string(),
        });
        assert!(state.is_editing_existing());
        assert_eq!(state.project.name, "A");
        assert_eq!(state.project.description, "d");
        assert!(state.is_valid());
    }

    #[test]
    fn field_editing_pushes_and_pops_characters() {
        let mut state = ProjectWizardState::new();
        state.toggle_editing();

        state.edit_current_field(KeyCode::Char('h'));
        state.edit_current_field(KeyCode::Char('i'));
        assert_eq!(state.project.name, "hi");

        state.edit_current_field(KeyCode::Backspace);
        assert_eq!(state.project.name, "h");

        state.toggle_editing();
        state.next_field();
        state.toggle_editing();
        state.edit_current_field(KeyCode::Char('x'));
        assert_eq!(state.project.description, "x");
    }

    #[test]
    fn save_requires_a_name() {
        let mut state = ProjectWizardState::new();
        assert!(!state.is_valid());

        state.toggle_editing();
        state.edit_current_field(KeyCode::Char('A'));
        assert!(state.is_valid());
    }

    #[test]
    fn failed_save_keeps_the_form_and_shows_the_error() {
        let mut state = ProjectWizardState::new();
        state.toggle_editing();
        state.edit_current_field(KeyCode::Char('A'));
        state.toggle_editing();

        state.fail("Failed to create project");

        assert_eq!(state.error(), Some("Failed to create project"));
        assert_eq!(state.project.name, "A");
    }
}
