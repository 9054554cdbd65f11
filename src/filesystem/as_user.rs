//! Operations performed on behalf of the current user.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FsResult;
use crate::identity::Owner;

use super::gateway::{symlink_command, Filesystem};

/// A [`Filesystem`] bound to a resolved owner.
///
/// Obtained from [`Filesystem::as_current_user`]. Each operation forwards to
/// the gateway with the bound owner, except symlink creation, which runs
/// `ln -s` through the command runner because a symlink's ownership cannot
/// be portably changed after the fact. The runner resolves its user through
/// the same provider as the gateway (see [`Filesystem::with_sudo`]), so the
/// link ends up owned by the bound owner.
pub struct AsUser<'a> {
    fs: &'a Filesystem,
    owner: Owner,
}

impl<'a> AsUser<'a> {
    pub(super) fn new(fs: &'a Filesystem, owner: Owner) -> Self {
        Self { fs, owner }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn create_directory(&self, path: impl AsRef<Path>, mode: u32) -> FsResult<()> {
        self.fs.create_directory(path, Some(&self.owner), mode)
    }

    pub fn ensure_directory_exists(&self, path: impl AsRef<Path>, mode: u32) -> FsResult<()> {
        self.fs.ensure_directory_exists(path, Some(&self.owner), mode)
    }

    pub fn touch(&self, path: impl AsRef<Path>) -> FsResult<PathBuf> {
        self.fs.touch(path, Some(&self.owner))
    }

    pub fn write_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> FsResult<()> {
        self.fs.write_file(path, contents, Some(&self.owner))
    }

    pub fn append_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> FsResult<()> {
        self.fs.append_file(path, contents, Some(&self.owner))
    }

    pub fn copy_file(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> FsResult<()> {
        let to = to.as_ref();
        self.fs.copy_file(from, to)?;
        self.fs.change_owner(to, &self.owner)
    }

    pub fn create_symlink(&self, target: impl AsRef<Path>, link: impl AsRef<Path>) -> FsResult<()> {
        let (target, link) = (target.as_ref(), link.as_ref());
        debug!(
            target = %target.display(),
            link = %link.display(),
            user = %self.owner,
            "Creating symlink as user"
        );

        self.fs.delete(link);
        self.fs
            .runner()
            .run_as_user(&symlink_command(target, link))?;
        Ok(())
    }
}
