pub mod init;
pub mod init_types;

pub use init::*;
pub use init_types::*;
