use notify::{
    Event, EventKind,
    event::{CreateKind, ModifyKind, RemoveKind, RenameMode},
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Kind of an entry that still exists on disk.
    pub fn of(path: &Path) -> Self {
        if path.is_dir() {
            Self::Directory
        } else {
            Self::File
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
        }
    }
}

/// Filesystem change the auditor cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    Created { path: PathBuf, kind: EntryKind },
    Deleted { path: PathBuf, kind: EntryKind },
    Moved { from: PathBuf, to: PathBuf, kind: EntryKind },
}

impl FsEvent {
    /// Translate a backend notification.
    ///
    /// Renames are taken from the paired `Both` notification. The halves the
    /// backend reports on their own are left to [`super::RenameHalves`];
    /// content and metadata changes are ignored.
    pub fn from_notify(event: &Event) -> Option<Self> {
        match &event.kind {
            EventKind::Create(create) => {
                let path = event.paths.first()?.clone();
                let kind = match create {
                    CreateKind::Folder => EntryKind::Directory,
                    CreateKind::File => EntryKind::File,
                    _ => EntryKind::of(&path),
                };
                Some(Self::Created { path, kind })
            }
            EventKind::Remove(remove) => {
                let kind = match remove {
                    RemoveKind::Folder => EntryKind::Directory,
                    RemoveKind::File => EntryKind::File,
                    _ => return None,
                };
                let path = event.paths.first()?.clone();
                Some(Self::Deleted { path, kind })
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                let [from, to] = event.paths.as_slice() else {
                    return None;
                };
                Some(Self::Moved {
                    from: from.clone(),
                    kind: EntryKind::of(to),
                    to: to.clone(),
                })
            }
            _ => None,
        }
    }
}
