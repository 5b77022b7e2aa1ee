pub mod sync_display;
