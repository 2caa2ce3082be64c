//! commit graph queries: ancestor sets, first-parent lineage, split points.
//!
//! all walks are iterative over commit ids with a visited set, so long linear
//! histories never grow the call stack.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_commit;
use crate::repo::Repo;

/// every commit reachable from `start`, including `start`
pub fn ancestors(repo: &Repo, start: &Hash) -> Result<HashSet<Hash>> {
    let mut visited = HashSet::new();
    let mut to_visit = vec![*start];

    while let Some(hash) = to_visit.pop() {
        if !visited.insert(hash) {
            continue;
        }
        let commit = read_commit(repo, &hash)?;
        to_visit.extend(commit.parents.iter().filter(|p| !visited.contains(*p)));
    }

    Ok(visited)
}

/// is `ancestor` reachable from `descendant` (a commit is its own ancestor)
pub fn is_ancestor(repo: &Repo, ancestor: &Hash, descendant: &Hash) -> Result<bool> {
    if ancestor == descendant {
        return Ok(true);
    }

    let mut visited = HashSet::new();
    let mut to_visit = vec![*descendant];

    while let Some(hash) = to_visit.pop() {
        if hash == *ancestor {
            return Ok(true);
        }
        if !visited.insert(hash) {
            continue;
        }
        let commit = read_commit(repo, &hash)?;
        to_visit.extend(commit.parents.iter().copied());
    }

    Ok(false)
}

/// `start` followed by its first parent, its first parent's first parent, ...
pub fn first_parent_history(repo: &Repo, start: &Hash) -> Result<Vec<Hash>> {
    let mut history = vec![*start];
    let mut current = read_commit(repo, start)?;

    while let Some(parent) = current.first_parent().copied() {
        history.push(parent);
        current = read_commit(repo, &parent)?;
    }

    Ok(history)
}

/// one side of the synchronised breadth-first search
struct Side {
    /// level and discovery order of every commit reached so far
    seen: HashMap<Hash, (usize, usize)>,
    frontier: Vec<Hash>,
    level: usize,
}

impl Side {
    fn new(start: Hash) -> Self {
        Self {
            seen: HashMap::from([(start, (0, 0))]),
            frontier: vec![start],
            level: 0,
        }
    }

    fn exhausted(&self) -> bool {
        self.frontier.is_empty()
    }

    fn depth(&self, hash: &Hash) -> Option<usize> {
        self.seen.get(hash).map(|&(level, _)| level)
    }

    fn order(&self, hash: &Hash) -> usize {
        self.seen.get(hash).map_or(usize::MAX, |&(_, order)| order)
    }

    /// expand one level; returns commits first reached at this level, in order
    fn expand(&mut self, repo: &Repo) -> Result<Vec<Hash>> {
        self.level += 1;
        let mut next = Vec::new();
        for hash in std::mem::take(&mut self.frontier) {
            let commit = read_commit(repo, &hash)?;
            for parent in commit.parents {
                if !self.seen.contains_key(&parent) {
                    let order = self.seen.len();
                    self.seen.insert(parent, (self.level, order));
                    next.push(parent);
                }
            }
        }
        self.frontier = next.clone();
        Ok(next)
    }
}

/// the split point of `a` and `b`
///
/// among the commits reachable from both, picks the one with the smallest
/// summed hop count from `a` and `b`. ties go to the candidate the walk from
/// `a` reached first, so `a`'s first-parent lineage wins.
pub fn lowest_common_ancestor(repo: &Repo, a: &Hash, b: &Hash) -> Result<Hash> {
    if a == b {
        return Ok(*a);
    }

    let mut side_a = Side::new(*a);
    let mut side_b = Side::new(*b);
    // (summed distance, order of discovery from a)
    let mut best: Option<(usize, usize, Hash)> = None;

    let consider = |candidate: (usize, usize, Hash), best: &mut Option<(usize, usize, Hash)>| {
        if best.map_or(true, |current| (candidate.0, candidate.1) < (current.0, current.1)) {
            *best = Some(candidate);
        }
    };

    while !side_a.exhausted() || !side_b.exhausted() {
        // every later candidate is at least one level past the shallower side,
        // and a later candidate at the same distance can still win the tie
        if let Some((d, _, _)) = best {
            if side_a.level.min(side_b.level) + 1 > d {
                break;
            }
        }

        if !side_a.exhausted() {
            for hash in side_a.expand(repo)? {
                if let Some(db) = side_b.depth(&hash) {
                    consider((side_a.level + db, side_a.order(&hash), hash), &mut best);
                }
            }
        }

        if !side_b.exhausted() {
            for hash in side_b.expand(repo)? {
                if let Some(da) = side_a.depth(&hash) {
                    consider((da + side_b.level, side_a.order(&hash), hash), &mut best);
                }
            }
        }
    }

    match best {
        Some((distance, _, hash)) => {
            debug!(%a, %b, split = %hash, distance, "found split point");
            Ok(hash)
        }
        None => Err(Error::NoCommonAncestor(*a, *b)),
    }
}
