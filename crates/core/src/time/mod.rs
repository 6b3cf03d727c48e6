pub mod window;

pub use window::DateWindow;
