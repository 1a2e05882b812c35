mod form_pane;
mod layout;
mod list_pane;
mod map_pane;
mod modals;
mod status_bar;

// Re-export the main render function
pub use layout::render_ui;
