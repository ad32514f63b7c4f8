use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Leading frame of every encoded value, naming the type of the payload after it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeTag {
    /// Position of the type pair in the engine's registration table.
    Registered(u32),
    /// Full Rust type name of a type nobody registered.
    Named(Cow<'static, str>),
}
