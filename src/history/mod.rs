pub mod changes;
pub mod git;

pub use changes::{changed_keys, ChangeSet};
pub use git::{GitRevisionReader, RevisionReader};
