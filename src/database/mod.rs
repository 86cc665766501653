pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryWorkspaceRepository;
pub use postgres::PgWorkspaceRepository;
pub use repository::{MembershipAuthority, WorkspaceRepository};
