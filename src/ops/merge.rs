//! three-way merge of a branch into HEAD.
//!
//! every path is classified against the split point of the two commits. paths
//! changed differently on both sides are not an error: both versions are
//! written into the file between conflict markers, the result is committed,
//! and the outcome reports which paths need attention.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::{is_ancestor, lowest_common_ancestor};
use crate::hash::Hash;
use crate::index::Index;
use crate::object::{commit_files, read_blob, write_blob, FileMap};
use crate::ops::checkout::{has_file_below, sync_worktree, untracked_in_the_way};
use crate::ops::commit::record_commit;
use crate::refs::{advance_head, read_branch, read_head};
use crate::repo::Repo;
use crate::worktree::WorkTree;

/// how one path relates across split point, current and given commits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeCase {
    /// same on all three
    Unchanged,
    /// only the given side changed it (possibly deleting it)
    TakenFromGiven,
    /// only the current side changed it (possibly deleting it)
    KeptCurrent,
    /// both sides made the same change
    ChangedIdentically,
    /// new on the current side only
    AddedInCurrent,
    /// new on the given side only
    AddedInGiven,
    /// gone from both sides
    DeletedInBoth,
    /// both sides changed it differently
    Conflict,
}

impl MergeCase {
    /// the blob the merged snapshot keeps for this path, `None` for absent
    ///
    /// conflicts have no single resolution and also return `None`.
    pub fn resolve(self, current: Option<&Hash>, given: Option<&Hash>) -> Option<Hash> {
        match self {
            MergeCase::Unchanged
            | MergeCase::KeptCurrent
            | MergeCase::ChangedIdentically
            | MergeCase::AddedInCurrent => current.copied(),
            MergeCase::TakenFromGiven | MergeCase::AddedInGiven => given.copied(),
            MergeCase::DeletedInBoth | MergeCase::Conflict => None,
        }
    }
}

/// classify one path by its blob in the split point, current and given commits
pub fn classify(base: Option<&Hash>, current: Option<&Hash>, given: Option<&Hash>) -> MergeCase {
    if current == given {
        return if base == current {
            MergeCase::Unchanged
        } else if current.is_none() {
            MergeCase::DeletedInBoth
        } else {
            MergeCase::ChangedIdentically
        };
    }

    match (base == current, base == given) {
        (true, _) if base.is_none() => MergeCase::AddedInGiven,
        (true, _) => MergeCase::TakenFromGiven,
        (_, true) if base.is_none() => MergeCase::AddedInCurrent,
        (_, true) => MergeCase::KeptCurrent,
        _ => MergeCase::Conflict,
    }
}

/// file content recording both sides of a conflict
///
/// an absent side renders as empty content; a non-empty side gets a trailing
/// newline if it lacks one, so the markers always start a line.
pub fn render_conflict(
    current_label: &str,
    given_label: &str,
    current: Option<&[u8]>,
    given: Option<&[u8]>,
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(format!("<<<<<<< {}\n", current_label).as_bytes());
    push_side(&mut out, current);
    out.extend_from_slice(b"=======\n");
    push_side(&mut out, given);
    out.extend_from_slice(format!(">>>>>>> {}\n", given_label).as_bytes());
    out
}

fn push_side(out: &mut Vec<u8>, content: Option<&[u8]>) {
    if let Some(content) = content {
        out.extend_from_slice(content);
        if !content.is_empty() && !content.ends_with(b"\n") {
            out.push(b'\n');
        }
    }
}

/// result of a successful merge
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// HEAD moved forward to the given commit; nothing was committed
    FastForward { commit: Hash },
    /// a merge commit was created; `conflicts` lists paths holding markers
    Merged { commit: Hash, conflicts: Vec<String> },
}

impl MergeOutcome {
    /// commit HEAD points at after the merge
    pub fn commit(&self) -> Hash {
        match self {
            MergeOutcome::FastForward { commit } | MergeOutcome::Merged { commit, .. } => *commit,
        }
    }

    pub fn is_conflicted(&self) -> bool {
        matches!(self, MergeOutcome::Merged { conflicts, .. } if !conflicts.is_empty())
    }

    pub fn conflicts(&self) -> &[String] {
        match self {
            MergeOutcome::FastForward { .. } => &[],
            MergeOutcome::Merged { conflicts, .. } => conflicts,
        }
    }
}

/// merged snapshot of three path maps
#[derive(Debug)]
struct MergedFiles {
    files: FileMap,
    conflicts: Vec<String>,
}

/// merge branch `given` into wherever HEAD points
pub fn merge(repo: &Repo, worktree: &dyn WorkTree, given: &str) -> Result<MergeOutcome> {
    if !Index::load(repo)?.is_empty() {
        return Err(Error::UncommittedChanges);
    }

    let given_commit = read_branch(repo, given)?;
    let head = read_head(repo)?;
    let current_commit = repo.head_commit()?;

    if given_commit == current_commit {
        return Err(Error::SelfMerge(given.to_string()));
    }
    if is_ancestor(repo, &given_commit, &current_commit)? {
        return Err(Error::AlreadyUpToDate(given.to_string()));
    }

    let current_files = commit_files(repo, &current_commit)?;
    let given_files = commit_files(repo, &given_commit)?;

    if is_ancestor(repo, &current_commit, &given_commit)? {
        sync_worktree(repo, worktree, &current_files, &given_files)?;
        advance_head(repo, &given_commit)?;
        info!(head = %head, to = %given_commit, "fast-forwarded");
        return Ok(MergeOutcome::FastForward {
            commit: given_commit,
        });
    }

    let split = lowest_common_ancestor(repo, &current_commit, &given_commit)?;
    let base_files = commit_files(repo, &split)?;
    debug!(current = %current_commit, given = %given_commit, split = %split, "three-way merge");

    let current_label = head.to_string();
    let merged = merge_files(
        repo,
        &base_files,
        &current_files,
        &given_files,
        &current_label,
        given,
    )?;

    // refuse before any working file or pointer changes
    let in_the_way = untracked_in_the_way(worktree, &current_files, &merged.files)?;
    if !in_the_way.is_empty() {
        return Err(Error::UntrackedFileConflict(in_the_way));
    }

    let message = format!("Merged {} into {}.", given, current_label);
    let commit = record_commit(
        repo,
        &merged.files,
        vec![current_commit, given_commit],
        &message,
    )?;

    sync_worktree(repo, worktree, &current_files, &merged.files)?;
    advance_head(repo, &commit)?;

    let mut index = Index::load(repo)?;
    index.clear();
    index.save(repo)?;

    if merged.conflicts.is_empty() {
        info!(commit = %commit, "merged {} into {}", given, current_label);
    } else {
        warn!(
            commit = %commit,
            conflicts = merged.conflicts.len(),
            "merged {} into {} with conflicts",
            given,
            current_label
        );
    }

    Ok(MergeOutcome::Merged {
        commit,
        conflicts: merged.conflicts,
    })
}

/// classify every path and build the merged snapshot
///
/// conflicted paths get a new blob holding both versions between markers. a
/// file left where the other side put a directory is moved aside to
/// `{path}~{side}` and reported as a conflict.
fn merge_files(
    repo: &Repo,
    base: &FileMap,
    current: &FileMap,
    given: &FileMap,
    current_label: &str,
    given_label: &str,
) -> Result<MergedFiles> {
    let paths: BTreeSet<&String> = base
        .keys()
        .chain(current.keys())
        .chain(given.keys())
        .collect();

    let mut files = FileMap::new();
    let mut conflicts = Vec::new();

    for path in paths {
        let (b, c, g) = (base.get(path), current.get(path), given.get(path));
        let case = classify(b, c, g);

        if case == MergeCase::Conflict {
            let current_content = c.map(|h| read_blob(repo, h)).transpose()?;
            let given_content = g.map(|h| read_blob(repo, h)).transpose()?;
            let content = render_conflict(
                current_label,
                given_label,
                current_content.as_deref(),
                given_content.as_deref(),
            );
            files.insert(path.clone(), write_blob(repo, &content)?);
            conflicts.push(path.clone());
            debug!(path = %path, "conflict");
        } else if let Some(blob) = case.resolve(c, g) {
            files.insert(path.clone(), blob);
        }
    }

    move_aside_collisions(&mut files, &mut conflicts, current, current_label, given_label);
    Ok(MergedFiles { files, conflicts })
}

/// rename merged files that sit where the merged snapshot also has a directory
fn move_aside_collisions(
    files: &mut FileMap,
    conflicts: &mut Vec<String>,
    current: &FileMap,
    current_label: &str,
    given_label: &str,
) {
    let colliding: Vec<String> = files
        .keys()
        .filter(|path| has_file_below(files, path))
        .cloned()
        .collect();
    if colliding.is_empty() {
        return;
    }

    for path in colliding {
        let blob = match files.remove(&path) {
            Some(blob) => blob,
            None => continue,
        };
        let side = if current.contains_key(&path) {
            current_label
        } else {
            given_label
        };
        let mut aside = format!("{}~{}", path, side.replace('/', "_"));
        while files.contains_key(&aside) {
            aside.push('~');
        }

        warn!(path = %path, aside = %aside, "file collides with a directory, moved aside");
        conflicts.retain(|p| p != &path);
        conflicts.push(aside.clone());
        files.insert(aside, blob);
    }
    conflicts.sort();
}
