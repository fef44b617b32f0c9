pub mod editor;
pub mod filters;
pub mod generation;
pub mod history;
pub mod imagen;
pub mod prompt;
pub mod state;
