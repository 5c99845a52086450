use ctp_application::SessionStore;
use ctp_core::project::Project;

pub fn list(store: &SessionStore) {
    let state = store.state();
    if !state.is_logged_in() {
        println!("Not logged in");
        return;
    }

    let selected = state.selected_project_id.as_deref();
    print_group("Active", &state.active_projects(), selected);
    print_group("Inactive (trial expired)", &state.inactive_projects(), selected);
}

fn print_group(title: &str, projects: &[&Project], selected: Option<&str>) {
    println!("{title}:");
    if projects.is_empty() {
        println!("  (none)");
    }
    for project in projects {
        let marker = if Some(project.id.as_str()) == selected {
            "*"
        } else {
            " "
        };
        println!("{marker} {:<24} {:<20} {}", project.id, project.key, project.name);
    }
}

pub async fn select(store: &mut SessionStore, project_id: &str) {
    store.select_project(project_id).await;
    match store.state().selected_project() {
        Some(project) => println!("Selected {} ({})", project.name, project.key),
        None => println!("Selected {project_id} (not in the project list)"),
    }
}
