pub mod bottom_bar;
pub mod main_view;
pub mod modal;
pub mod top;
pub mod util;
