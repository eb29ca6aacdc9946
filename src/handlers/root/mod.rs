pub mod actions;
pub mod confirm;
pub mod reset;
pub mod tenant;
