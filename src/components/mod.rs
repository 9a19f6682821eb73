pub mod embed_widget;
pub mod feedback_dialog;
pub mod result_explanation;
pub mod task_editor;
