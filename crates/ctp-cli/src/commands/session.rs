use anyhow::{Result, bail};
use ctp_application::SessionStore;

pub async fn login(store: &mut SessionStore, email: &str, password: &str) -> Result<()> {
    store.authenticate(email, password).await;

    let state = store.state();
    if !state.is_logged_in() {
        let message = state
            .login_error_message
            .clone()
            .unwrap_or_else(|| "Login failed".to_string());
        bail!(message);
    }

    let name = state
        .user
        .as_ref()
        .map(|user| user.display_name())
        .unwrap_or_else(|| email.to_string());
    println!("Logged in as {name}");
    if let Some(message) = &state.login_error_message {
        println!("{message}");
    }
    if let Some(project) = state.selected_project() {
        println!("Selected project: {} ({})", project.name, project.key);
    }
    Ok(())
}

pub fn status(store: &SessionStore) {
    let state = store.state();
    if !state.is_logged_in() {
        println!("Not logged in");
        if let Some(message) = &state.login_error_message {
            println!("Last error: {message}");
        }
        return;
    }

    match &state.user {
        Some(user) => println!("User:     {} <{}>", user.display_name(), user.email),
        None => println!("User:     {}", state.user_id.as_deref().unwrap_or("-")),
    }
    println!(
        "Projects: {} active, {} inactive",
        state.active_project_ids.len(),
        state.inactive_project_ids.len()
    );
    match (state.selected_project(), &state.selected_project_id) {
        (Some(project), _) => println!("Selected: {} ({})", project.name, project.id),
        (None, Some(id)) => println!("Selected: {id} (unknown project)"),
        (None, None) => println!("Selected: -"),
    }
    if let Some(message) = &state.login_error_message {
        println!("{message}");
    }
}

pub async fn logout(store: &mut SessionStore) {
    store.logout().await;
    println!("Logged out");
}
