mod change;
mod commit;
mod head;
mod object;
mod tree;

pub use change::{ChangeKind, DiffEntry};
pub use commit::Commit;
pub use head::Head;
pub use object::ObjectKind;
pub use tree::{EntryKind, Tree, TreeEntry};
pub(crate) use tree::validate_entry_name;
