//! Tree lookup and listing.

use serde::Serialize;

use crate::command::{GitCommand, RunOptions};
use crate::error::{GitError, Result};
use crate::object_id::ObjectId;
use crate::repository::{ObjectKind, Repository};

/// A tree object looked up through [`Repository::get_tree`].
#[derive(Debug, Clone)]
pub struct Tree {
    id: ObjectId,
    resolved_id: ObjectId,
    repo: Repository,
}

/// One entry of a tree, as printed by `ls-tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// File mode in octal, e.g. `100644`.
    pub mode: String,
    /// Kind of the referenced object (`commit` for submodules).
    pub kind: ObjectKind,
    /// Id of the referenced object.
    pub id: ObjectId,
    /// Entry name relative to the tree.
    pub name: String,
}

impl Tree {
    /// The tree's own id.
    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// The id the caller's reference resolved to before dereferencing.
    ///
    /// Equal to [`Tree::id`] when a tree was asked for directly; the commit
    /// id when a commit (or a ref pointing at one) was asked for.
    pub fn resolved_id(&self) -> &ObjectId {
        &self.resolved_id
    }

    /// List the direct entries of this tree.
    ///
    /// # Errors
    ///
    /// Returns the invocation error, or [`GitError::UnexpectedOutput`] for a
    /// record that does not parse.
    pub fn entries(&self) -> Result<Vec<TreeEntry>> {
        let cmd = GitCommand::new("ls-tree").args(["-z", &self.id.to_hex()]);
        let out = self.repo.run(cmd, RunOptions::new())?;
        parse_ls_tree(&out.stdout)
    }
}

impl Repository {
    /// Look up a tree by id, abbreviation or ref.
    ///
    /// Commits (and refs naming them) are dereferenced to their tree; the
    /// pre-dereference id is kept as [`Tree::resolved_id`].
    ///
    /// # Errors
    ///
    /// Returns a resolution error if `id_or_ref` does not name an object, or
    /// [`GitError::NotFound`] if the object is missing or not a tree.
    pub fn get_tree(&self, id_or_ref: &str) -> Result<Tree> {
        let resolved_id = self.resolve(id_or_ref)?;
        let id = self.dereference(resolved_id)?;
        match self.object_kind(&id) {
            Ok(ObjectKind::Tree) => {}
            Ok(_) | Err(GitError::NotFound { .. }) => {
                return Err(GitError::NotFound {
                    kind: "tree",
                    id: id.to_hex(),
                });
            }
            Err(err) => return Err(err),
        }
        Ok(Tree {
            id,
            resolved_id,
            repo: self.clone(),
        })
    }
}

/// Parse NUL-terminated `ls-tree -z` records:
/// `<mode> SP <type> SP <id> TAB <name> NUL`.
fn parse_ls_tree(stdout: &str) -> Result<Vec<TreeEntry>> {
    stdout
        .split('\0')
        .filter(|record| !record.is_empty())
        .map(parse_ls_tree_record)
        .collect()
}

fn parse_ls_tree_record(record: &str) -> Result<TreeEntry> {
    let unexpected = || GitError::UnexpectedOutput {
        command: "ls-tree".to_string(),
        output: record.to_string(),
    };

    let (meta, name) = record.split_once('\t').ok_or_else(unexpected)?;
    let mut fields = meta.split(' ');
    let (Some(mode), Some(kind), Some(id), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(unexpected());
    };

    Ok(TreeEntry {
        mode: mode.to_string(),
        kind: ObjectKind::parse(kind).ok_or_else(unexpected)?,
        id: ObjectId::from_hex(id)?,
        name: name.to_string(),
    })
}
