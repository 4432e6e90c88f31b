pub mod dashboard;
pub mod drill_editor;
pub mod quiz;
pub mod settings;
pub mod shorts;
pub mod summary;
pub mod test_form;
