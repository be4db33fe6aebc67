pub mod diagram;
pub mod inspector;
pub mod menu;
pub mod theme;
