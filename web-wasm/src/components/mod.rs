pub mod camera_feed;
pub mod cart_summary;
pub mod header;
pub mod scan_button;
pub mod settings_panel;
pub mod total_footer;
