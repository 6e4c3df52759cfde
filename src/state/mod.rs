pub mod detail;
pub mod list_view;

pub use detail::DetailView;
pub use list_view::{Filterable, ListNav, ListView};
