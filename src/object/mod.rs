pub mod blob;
pub mod commit;
pub mod snapshot;
pub mod store;
pub mod tree;

pub use blob::{ensure_blob, read_blob, write_blob};
pub use commit::{read_commit, write_commit};
pub use snapshot::{build_tree, commit_files, flatten_tree, validate_path, FileMap};
pub use store::{
    get, get_kind, list_object_ids, list_objects, object_exists, object_path, put,
    resolve_commit_prefix, MIN_PREFIX_LEN,
};
pub use tree::{read_tree, write_tree};
