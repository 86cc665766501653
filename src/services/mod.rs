pub mod image_reconciler;
pub mod workspace_service;

pub use image_reconciler::{ImageError, ImageFile, ImageReconciler, StorageCleanupWarning};
pub use workspace_service::{ActionOutcome, WorkspaceError, WorkspaceForm, WorkspaceService};
