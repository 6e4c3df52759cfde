mod app;
pub mod events;
pub mod fetch;
pub mod navigator;
pub mod startup;

pub use app::App;
