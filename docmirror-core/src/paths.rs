use std::path::{Path, PathBuf};

use crate::types::{RepoName, RepoOwner};

/// Host segment under `<root>/src`, matching the import path layout the
/// renderer expects.
pub const MIRROR_HOST: &str = "github.com";

pub fn mirror_src_dir(root: &Path) -> PathBuf {
    root.join("src").join(MIRROR_HOST)
}

pub fn mirror_path(root: &Path, owner: &RepoOwner, name: &RepoName) -> PathBuf {
    mirror_src_dir(root).join(&owner.0).join(&name.0)
}
