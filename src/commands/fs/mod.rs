//! Filesystem commands.
//!
//! - `fs.is_dir`, `fs.mkdir`, `fs.ensure_dir` - directories
//! - `fs.touch`, `fs.exists`, `fs.read`, `fs.write`, `fs.append`, `fs.copy`, `fs.delete` - files
//! - `fs.symlink`, `fs.is_link`, `fs.readlink`, `fs.realpath` - links and paths
//! - `fs.chown`, `fs.chgrp`, `fs.chmod` - ownership and permissions
//!
//! Mutating commands accept `owner` (name or UID) and `as_user` (bool).
//! `as_user: true` hands the result to the current non-root user and takes
//! precedence over `owner`.

mod directory;
mod file;
mod link;
mod ownership;

pub use directory::{CreateDirectoryCommand, EnsureDirectoryCommand, IsDirectoryCommand};
pub use file::{
    AppendFileCommand, CopyFileCommand, DeleteCommand, ExistsCommand, ReadFileCommand,
    TouchCommand, WriteFileCommand,
};
pub use link::{IsSymlinkCommand, ReadSymlinkCommand, RealPathCommand, SymlinkCommand};
pub use ownership::{ChangeGroupCommand, ChangeOwnerCommand, SetPermissionsCommand};

use crate::error::FsError;
use crate::filesystem::Filesystem;
use crate::identity::Owner;

use super::types::CommandParams;

/// Owner requested by the `as_user`/`owner` parameters.
fn requested_owner(fs: &Filesystem, params: &CommandParams) -> Result<Option<Owner>, FsError> {
    if params.get_optional_bool("as_user", false) {
        return Ok(Some(fs.as_current_user()?.owner().clone()));
    }
    params.get_optional_owner("owner")
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use crate::error::FsResult;
    use crate::executor::{CommandRunner, SubprocessResult};
    use crate::filesystem::Filesystem;
    use crate::identity::{FixedUser, Owner};

    /// Records commands instead of running them.
    #[derive(Default)]
    pub struct RecordingRunner {
        pub commands: Mutex<Vec<String>>,
    }

    impl CommandRunner for RecordingRunner {
        fn run_as_user(&self, command: &str) -> FsResult<SubprocessResult> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(SubprocessResult {
                success: true,
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    /// Gateway whose current user is the test process itself, so chown
    /// succeeds without privileges.
    pub fn test_filesystem() -> (Arc<Filesystem>, Arc<RecordingRunner>) {
        let runner = Arc::new(RecordingRunner::default());
        let user = Arc::new(FixedUser(Owner::Id(nix::unistd::geteuid().as_raw())));
        let fs = Arc::new(Filesystem::new(runner.clone(), user));
        (fs, runner)
    }
}
