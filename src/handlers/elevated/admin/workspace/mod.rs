pub mod create;
pub mod delete;
pub mod image_delete;
pub mod list;
pub mod show;
pub mod update;

pub use create::admin_workspace_create;
pub use delete::admin_workspace_delete;
pub use image_delete::admin_workspace_image_delete;
pub use list::admin_workspace_list;
pub use show::admin_workspace_show;
pub use update::admin_workspace_update;
