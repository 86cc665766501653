pub mod delete;
pub mod image_delete;
pub mod picker;
pub mod settings;
pub mod update;

pub use delete::workspace_delete;
pub use image_delete::workspace_image_delete;
pub use picker::workspace_picker;
pub use settings::workspace_settings;
pub use update::workspace_update;
