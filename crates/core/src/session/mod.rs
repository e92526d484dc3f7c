mod binding;
mod types;

pub use binding::Session;
pub use types::PrincipalId;
