//! # System Interaction Layer
//!
//! Everything that touches the alias scripts folder.
//!
//! ## Modules
//!
//! - **`scripts`**: The `ScriptStore` trait and `ShimScripts`, which writes, lists and
//!   removes one executable shim per alias.
//! - **`shim`**: Renders the content of a shim for a POSIX shell or `cmd.exe`.

pub mod scripts;
pub mod shim;
