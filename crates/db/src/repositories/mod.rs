pub mod account_repo;
pub mod catalog_repo;
pub mod workspace_repo;

pub use account_repo::AccountRepo;
pub use catalog_repo::CatalogRepo;
pub use workspace_repo::WorkspaceRepo;
