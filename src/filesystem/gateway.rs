//! The filesystem gateway.

use std::borrow::Cow;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{chown, symlink, DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use nix::sys::stat::{utimensat, UtimensatFlags};
use nix::sys::time::TimeSpec;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{CommandsConfig, Settings};
use crate::error::{FsError, FsResult};
use crate::executor::{CommandRunner, SudoRunner};
use crate::identity::{CurrentUser, FixedUser, Group, Owner, SudoUser};

use super::as_user::AsUser;

/// Default permissions for created directories.
pub const DEFAULT_DIRECTORY_MODE: u32 = 0o755;

/// Filesystem operations with optional ownership hand-off.
///
/// Every mutating operation takes an optional [`Owner`]; when present the
/// path is chown'd after the operation succeeds. A failed chown leaves the
/// created or written entry in place and returns the chown error.
///
/// The `*_as_current_user` variants resolve the non-root user once through
/// [`Filesystem::as_current_user`] and forward to the base operation.
pub struct Filesystem {
    runner: Arc<dyn CommandRunner>,
    user: Arc<dyn CurrentUser>,
    directory_mode: u32,
}

impl Filesystem {
    /// Build a gateway from explicit collaborators.
    ///
    /// `runner` must act as the same user that `user` resolves to: symlinks
    /// created as the current user are owned by whoever the runner runs as.
    /// [`Filesystem::with_sudo`] builds both from one provider.
    pub fn new(runner: Arc<dyn CommandRunner>, user: Arc<dyn CurrentUser>) -> Self {
        Self {
            runner,
            user,
            directory_mode: DEFAULT_DIRECTORY_MODE,
        }
    }

    /// A gateway whose [`SudoRunner`] shares `user` with the gateway.
    pub fn with_sudo(commands: &CommandsConfig, user: Arc<dyn CurrentUser>) -> Self {
        let runner = Arc::new(SudoRunner::from_config(commands, Arc::clone(&user)));
        Self::new(runner, user)
    }

    /// Wire collaborators from configuration.
    ///
    /// A configured `user.name` pins the current user; otherwise it is
    /// resolved from `SUDO_USER`/`USER` on each call.
    pub fn from_settings(settings: &Settings) -> FsResult<Self> {
        let user: Arc<dyn CurrentUser> = match &settings.user.name {
            Some(name) => Arc::new(FixedUser(name.parse()?)),
            None => Arc::new(SudoUser),
        };
        Ok(Self::with_sudo(&settings.commands, user)
            .with_directory_mode(settings.directory_mode()?))
    }

    /// Mode used for new directories when a caller does not give one.
    pub fn with_directory_mode(mut self, mode: u32) -> Self {
        self.directory_mode = mode;
        self
    }

    pub fn directory_mode(&self) -> u32 {
        self.directory_mode
    }

    /// Resolve the current user and return a scope whose operations assign
    /// ownership to that user.
    pub fn as_current_user(&self) -> FsResult<AsUser<'_>> {
        let owner = self.user.current_user()?;
        Ok(AsUser::new(self, owner))
    }

    pub(super) fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn is_directory(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().is_dir()
    }

    /// Create a directory and any missing parents.
    ///
    /// `mode` is set explicitly on the leaf so the process umask does not
    /// narrow it. Fails if the path already exists.
    pub fn create_directory(
        &self,
        path: impl AsRef<Path>,
        owner: Option<&Owner>,
        mode: u32,
    ) -> FsResult<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), mode = %format_args!("{:o}", mode), owner = ?owner, "Creating directory");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            DirBuilder::new()
                .recursive(true)
                .mode(mode)
                .create(parent)
                .map_err(|e| FsError::io("create directory", parent, e))?;
        }
        DirBuilder::new()
            .mode(mode)
            .create(path)
            .map_err(|e| FsError::io("create directory", path, e))?;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .map_err(|e| FsError::io("set permissions", path, e))?;

        self.apply_owner(path, owner)
    }

    /// Create the directory unless a directory is already there.
    pub fn ensure_directory_exists(
        &self,
        path: impl AsRef<Path>,
        owner: Option<&Owner>,
        mode: u32,
    ) -> FsResult<()> {
        let path = path.as_ref();
        if self.is_directory(path) {
            return Ok(());
        }
        self.create_directory(path, owner, mode)
    }

    pub fn create_directory_as_current_user(
        &self,
        path: impl AsRef<Path>,
        mode: u32,
    ) -> FsResult<()> {
        self.as_current_user()?.create_directory(path, mode)
    }

    /// Create an empty file, or bump the access and modification times of an
    /// existing entry. Returns the path.
    ///
    /// Existing entries are never opened, so directories and read-only files
    /// owned by the caller can be touched.
    pub fn touch(&self, path: impl AsRef<Path>, owner: Option<&Owner>) -> FsResult<PathBuf> {
        let path = path.as_ref();
        debug!(path = %path.display(), owner = ?owner, "Touching file");

        if self.exists(path) {
            let now = TimeSpec::from(
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default(),
            );
            utimensat(None, path, &now, &now, UtimensatFlags::FollowSymlink)
                .map_err(|errno| FsError::io("touch", path, std::io::Error::from(errno)))?;
        } else {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| FsError::io("touch", path, e))?;
        }

        self.apply_owner(path, owner)?;
        Ok(path.to_path_buf())
    }

    pub fn touch_as_current_user(&self, path: impl AsRef<Path>) -> FsResult<PathBuf> {
        self.as_current_user()?.touch(path)
    }

    /// Whether the path exists. Symlinks are followed, so a dangling link
    /// does not exist; see [`Filesystem::is_symlink`].
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().exists()
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> FsResult<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).map_err(|e| FsError::io("read", path, e))
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> FsResult<String> {
        let path = path.as_ref();
        fs::read_to_string(path).map_err(|e| FsError::io("read", path, e))
    }

    /// Replace the file's contents, creating it if needed.
    pub fn write_file(
        &self,
        path: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
        owner: Option<&Owner>,
    ) -> FsResult<()> {
        let path = path.as_ref();
        let contents = contents.as_ref();
        debug!(path = %path.display(), bytes = contents.len(), owner = ?owner, "Writing file");

        fs::write(path, contents).map_err(|e| FsError::io("write", path, e))?;
        self.apply_owner(path, owner)
    }

    pub fn write_file_as_current_user(
        &self,
        path: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) -> FsResult<()> {
        self.as_current_user()?.write_file(path, contents)
    }

    /// Write through a sibling temp file and rename it over the target, so
    /// readers never observe a partial file.
    ///
    /// The temp file carries a random suffix and is created exclusively.
    pub fn write_file_atomic(
        &self,
        path: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
        owner: Option<&Owner>,
    ) -> FsResult<()> {
        let path = path.as_ref();
        let contents = contents.as_ref();
        debug!(path = %path.display(), bytes = contents.len(), owner = ?owner, "Writing file atomically");

        let file_name = path.file_name().ok_or_else(|| {
            FsError::io(
                "write",
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
        let temp_path = path.with_file_name(format!(
            ".{}.{}.tmp",
            file_name.to_string_lossy(),
            Uuid::new_v4().simple()
        ));

        let result = (|| -> FsResult<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)
                .map_err(|e| FsError::io("create temp file", &temp_path, e))?;
            file.write_all(contents)
                .map_err(|e| FsError::io("write", &temp_path, e))?;
            file.sync_all()
                .map_err(|e| FsError::io("sync", &temp_path, e))?;
            self.apply_owner(&temp_path, owner)?;
            fs::rename(&temp_path, path).map_err(|e| FsError::io("rename", path, e))
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    /// Append to the file, creating it if needed.
    pub fn append_file(
        &self,
        path: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
        owner: Option<&Owner>,
    ) -> FsResult<()> {
        let path = path.as_ref();
        let contents = contents.as_ref();
        debug!(path = %path.display(), bytes = contents.len(), owner = ?owner, "Appending to file");

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(contents))
            .map_err(|e| FsError::io("append", path, e))?;
        self.apply_owner(path, owner)
    }

    pub fn append_file_as_current_user(
        &self,
        path: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) -> FsResult<()> {
        self.as_current_user()?.append_file(path, contents)
    }

    /// Copy a file, overwriting the destination.
    ///
    /// Errors name the source if it cannot be read and the destination
    /// otherwise.
    pub fn copy_file(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> FsResult<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        debug!(from = %from.display(), to = %to.display(), "Copying file");

        fs::metadata(from).map_err(|e| FsError::io("copy", from, e))?;
        fs::copy(from, to).map_err(|e| FsError::io("copy", to, e))?;
        Ok(())
    }

    pub fn copy_file_as_current_user(
        &self,
        from: impl AsRef<Path>,
        to: impl AsRef<Path>,
    ) -> FsResult<()> {
        self.as_current_user()?.copy_file(from, to)
    }

    /// Point `link` at `target`, replacing whatever is at `link`.
    pub fn create_symlink(&self, target: impl AsRef<Path>, link: impl AsRef<Path>) -> FsResult<()> {
        let (target, link) = (target.as_ref(), link.as_ref());
        debug!(target = %target.display(), link = %link.display(), "Creating symlink");

        self.delete(link);
        symlink(target, link).map_err(|e| FsError::io("symlink", link, e))
    }

    /// Like [`Filesystem::create_symlink`], but the link is created by the
    /// current user through the command runner so that the user owns it.
    pub fn create_symlink_as_current_user(
        &self,
        target: impl AsRef<Path>,
        link: impl AsRef<Path>,
    ) -> FsResult<()> {
        self.as_current_user()?.create_symlink(target, link)
    }

    /// Remove a file or symlink if there is one. Never fails.
    ///
    /// Deletion is best effort: a failure after the existence check (e.g.
    /// permission denied, or `path` being a directory) is logged at `warn`
    /// and otherwise ignored.
    pub fn delete(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if !(self.exists(path) || self.is_symlink(path)) {
            return;
        }
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Deleted"),
            Err(e) => warn!(path = %path.display(), error = %e, "Ignoring failed delete"),
        }
    }

    pub fn change_owner(&self, path: impl AsRef<Path>, owner: &Owner) -> FsResult<()> {
        let path = path.as_ref();
        let uid = owner.resolve()?;
        debug!(path = %path.display(), owner = %owner, uid = uid.as_raw(), "Changing owner");

        chown(path, Some(uid.as_raw()), None).map_err(|e| FsError::io("chown", path, e))
    }

    pub fn change_group(&self, path: impl AsRef<Path>, group: &Group) -> FsResult<()> {
        let path = path.as_ref();
        let gid = group.resolve()?;
        debug!(path = %path.display(), group = %group, gid = gid.as_raw(), "Changing group");

        chown(path, None, Some(gid.as_raw())).map_err(|e| FsError::io("chgrp", path, e))
    }

    /// Set permission bits. Symlinks are refused rather than followed.
    pub fn set_permissions(&self, path: impl AsRef<Path>, mode: u32) -> FsResult<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), mode = %format_args!("{:o}", mode), "Setting permissions");

        if self.is_symlink(path) {
            return Err(FsError::io(
                "chmod",
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "cannot set permissions on a symlink",
                ),
            ));
        }
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .map_err(|e| FsError::io("chmod", path, e))
    }

    /// Canonical absolute path with all symlinks resolved.
    pub fn resolve_real_path(&self, path: impl AsRef<Path>) -> FsResult<PathBuf> {
        let path = path.as_ref();
        fs::canonicalize(path).map_err(|e| FsError::io("resolve", path, e))
    }

    pub fn is_symlink(&self, path: impl AsRef<Path>) -> bool {
        fs::symlink_metadata(path)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
    }

    pub fn read_symlink_target(&self, path: impl AsRef<Path>) -> FsResult<PathBuf> {
        let path = path.as_ref();
        fs::read_link(path).map_err(|e| FsError::io("readlink", path, e))
    }

    fn apply_owner(&self, path: &Path, owner: Option<&Owner>) -> FsResult<()> {
        match owner {
            Some(owner) => self.change_owner(path, owner),
            None => Ok(()),
        }
    }
}

/// The shell command that creates `link` pointing at `target`, with both
/// paths quoted for `sh`.
pub fn symlink_command(target: &Path, link: &Path) -> String {
    format!(
        "ln -s {} {}",
        shell_escape::unix::escape(Cow::Owned(target.to_string_lossy().into_owned())),
        shell_escape::unix::escape(Cow::Owned(link.to_string_lossy().into_owned())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symlink_command_plain_paths() {
        assert_eq!(
            symlink_command(Path::new("/srv/app/current"), Path::new("/var/www/app")),
            "ln -s /srv/app/current /var/www/app"
        );
    }

    #[test]
    fn test_symlink_command_quotes_special_characters() {
        assert_eq!(
            symlink_command(Path::new("/srv/my app"), Path::new("/tmp/it's")),
            r#"ln -s '/srv/my app' '/tmp/it'\''s'"#
        );
    }

    #[test]
    fn test_symlink_command_neutralizes_substitution() {
        let command = symlink_command(Path::new("$(reboot)"), Path::new("/tmp/x;id"));
        assert_eq!(command, "ln -s '$(reboot)' '/tmp/x;id'");
    }

    #[test]
    fn test_with_sudo_runner_acts_as_bound_user() {
        // `echo` stands in for the helper and prints the arguments it was given.
        let config = CommandsConfig {
            program: "echo".to_string(),
            shell: "sh".to_string(),
            timeout_seconds: 5,
        };
        let fs = Filesystem::with_sudo(&config, Arc::new(FixedUser(Owner::Id(4321))));

        let scope = fs.as_current_user().unwrap();
        assert_eq!(scope.owner(), &Owner::Id(4321));

        let result = fs.runner().run_as_user("true").unwrap();
        assert_eq!(result.stdout.trim(), "-u #4321 sh -c true");
    }

    #[test]
    fn test_from_settings_uses_configured_directory_mode() {
        let settings = Settings::from_toml(
            r#"
            [user]
            name = "root"

            [defaults]
            directory_mode = "0750"
            "#,
        )
        .unwrap();

        let fs = Filesystem::from_settings(&settings).unwrap();
        assert_eq!(fs.directory_mode(), 0o750);
    }

    #[test]
    fn test_new_uses_default_directory_mode() {
        let fs = Filesystem::with_sudo(
            &CommandsConfig::default(),
            Arc::new(FixedUser(Owner::Id(0))),
        );
        assert_eq!(fs.directory_mode(), DEFAULT_DIRECTORY_MODE);
        assert_eq!(fs.with_directory_mode(0o700).directory_mode(), 0o700);
    }
}
