pub mod registry;

pub use registry::{ProjectRegistry, find_project_root};
