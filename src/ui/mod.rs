pub mod dialogs;
pub mod process_tab;
