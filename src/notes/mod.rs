pub mod handlers;
mod service;

pub use service::NoteService;
