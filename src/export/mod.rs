pub mod component;
pub mod flow;
pub mod multimc;

pub use component::{components_for, PackComponent};
pub use flow::export_multimc;
pub use multimc::compose;
