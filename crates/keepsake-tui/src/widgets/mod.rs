mod nav_bar;
mod particles;
mod popup;
mod section_view;
mod status_bar;

pub use nav_bar::{nav_layout, NavBarWidget};
pub use particles::ParticlesWidget;
pub use popup::PopupWidget;
pub use section_view::SectionViewWidget;
pub use status_bar::StatusBarWidget;
