pub mod uploads_panel;

pub use uploads_panel::{format_bytes, PanelRow, UploadsPanel};
