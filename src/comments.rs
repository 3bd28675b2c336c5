//! Association between top-level comment groups and the declarations that own them.
//!
//! Ownership is keyed by `DeclId`, never by the shape of a declaration. When a
//! rewrite replaces a declaration with a differently shaped one it must call
//! [`CommentMap::rekey`], or the printer will no longer find the comments.

use crate::ast::{CommentGroup, Decl, DeclId, GroupId, SourceFile};
use std::collections::HashMap;

/// Who a comment group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Decl(DeclId),
    /// Comments after the last declaration
    File,
}

/// Where a group sits relative to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Above the declaration (doc comments, directives)
    Leading,
    /// Starts on the line the declaration ends on
    Trailing,
}

#[derive(Debug, Clone, Default)]
pub struct CommentMap {
    by_owner: HashMap<Owner, Vec<(GroupId, Placement)>>,
    by_group: HashMap<GroupId, (Owner, Placement)>,
}

impl CommentMap {
    /// Associate every comment group of `file` with exactly one owner.
    ///
    /// A group starting on the line where the previous declaration ends trails
    /// that declaration. Any other group leads the next declaration, whether or
    /// not a blank line separates them. Groups after the last declaration
    /// belong to the file.
    pub fn new(file: &SourceFile) -> Self {
        let mut map = Self::default();
        let spans: Vec<_> = file
            .decls
            .iter()
            .filter_map(|d| d.span.map(|s| (d.id, s)))
            .collect();

        for group in &file.comments {
            let span = group.span();
            let prev = spans.iter().rev().find(|(_, s)| s.end.byte <= span.start.byte);
            let next = spans.iter().find(|(_, s)| s.start.byte >= span.end.byte);

            let (owner, placement) = match (prev, next) {
                (Some((id, s)), _) if s.end.line == span.start.line => {
                    (Owner::Decl(*id), Placement::Trailing)
                }
                (_, Some((id, _))) => (Owner::Decl(*id), Placement::Leading),
                _ => (Owner::File, Placement::Trailing),
            };
            map.insert(group.id, owner, placement);
        }
        map
    }

    fn insert(&mut self, group: GroupId, owner: Owner, placement: Placement) {
        self.by_owner.entry(owner).or_default().push((group, placement));
        self.by_group.insert(group, (owner, placement));
    }

    pub fn owner(&self, group: GroupId) -> Option<Owner> {
        self.by_group.get(&group).map(|(owner, _)| *owner)
    }

    pub fn placement(&self, group: GroupId) -> Option<Placement> {
        self.by_group.get(&group).map(|(_, placement)| *placement)
    }

    /// Groups owned by `owner` with the given placement, in source order
    pub fn groups(&self, owner: Owner, placement: Placement) -> impl Iterator<Item = GroupId> + '_ {
        self.by_owner
            .get(&owner)
            .into_iter()
            .flatten()
            .filter(move |(_, p)| *p == placement)
            .map(|(g, _)| *g)
    }

    /// The doc comment of a declaration: the leading group that ends on the
    /// line right above it.
    pub fn doc<'g>(&self, groups: &'g [CommentGroup], decl: &Decl) -> Option<&'g CommentGroup> {
        let start_line = decl.span?.start.line;
        self.groups(Owner::Decl(decl.id), Placement::Leading)
            .filter_map(|g| groups.iter().find(|c| c.id == g))
            .find(|c| c.span().end.line + 1 == start_line)
    }

    /// Move every group owned by `old` to `new`, keeping placement and order.
    pub fn rekey(&mut self, old: DeclId, new: DeclId) {
        let Some(moved) = self.by_owner.remove(&Owner::Decl(old)) else {
            return;
        };
        for (group, placement) in &moved {
            self.by_group.insert(*group, (Owner::Decl(new), *placement));
        }
        self.by_owner.entry(Owner::Decl(new)).or_default().extend(moved);
    }

    /// Hand groups whose owner is gone from `file` over to the file itself.
    /// Returns the groups that were moved.
    pub fn filter(&mut self, file: &SourceFile) -> Vec<GroupId> {
        let orphaned: Vec<DeclId> = self
            .by_owner
            .keys()
            .filter_map(|owner| match owner {
                Owner::Decl(id) if !file.contains(*id) => Some(*id),
                _ => None,
            })
            .collect();

        let mut moved = Vec::new();
        for id in orphaned {
            if let Some(groups) = self.by_owner.remove(&Owner::Decl(id)) {
                for (group, _) in groups {
                    self.insert(group, Owner::File, Placement::Trailing);
                    moved.push(group);
                }
            }
        }
        moved.sort();
        if let Some(file_groups) = self.by_owner.get_mut(&Owner::File) {
            file_groups.sort_by_key(|(g, _)| *g);
        }
        moved
    }

    pub fn len(&self) -> usize {
        self.by_group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_group.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{GoParser, Parser};

    const SOURCE: &str = r#"// Package calc does sums.
package calc

//go:generate mockable -interface=Calculator -filename=calc.go

// Add returns a+b.
func Add(a, b int) int {
	return a + b
}

func Sub(a, b int) int { return a - b } // subtraction

// end of file
"#;

    fn decl_named(file: &SourceFile, name: &str) -> DeclId {
        file.decls
            .iter()
            .find(|d| matches!(&d.kind, crate::ast::DeclKind::Func(f) if f.name == name))
            .map(|d| d.id)
            .unwrap()
    }

    #[test]
    fn test_every_group_has_one_owner() {
        let file = GoParser::new().parse(SOURCE).unwrap();
        let map = CommentMap::new(&file);
        assert_eq!(map.len(), file.comments.len());
        for group in &file.comments {
            assert!(map.owner(group.id).is_some());
        }
    }

    #[test]
    fn test_leading_trailing_and_file_owners() {
        let file = GoParser::new().parse(SOURCE).unwrap();
        let map = CommentMap::new(&file);
        let package = file.decls[0].id;
        let add = decl_named(&file, "Add");
        let sub = decl_named(&file, "Sub");

        assert_eq!(map.owner(GroupId(0)), Some(Owner::Decl(package)));
        // The directive is detached from Add by a blank line but still leads it
        assert_eq!(map.owner(GroupId(1)), Some(Owner::Decl(add)));
        assert_eq!(map.owner(GroupId(2)), Some(Owner::Decl(add)));
        assert_eq!(map.owner(GroupId(3)), Some(Owner::Decl(sub)));
        assert_eq!(map.placement(GroupId(3)), Some(Placement::Trailing));
        assert_eq!(map.owner(GroupId(4)), Some(Owner::File));
    }

    #[test]
    fn test_doc_is_adjacent_leading_group() {
        let file = GoParser::new().parse(SOURCE).unwrap();
        let map = CommentMap::new(&file);
        let add = file.get(decl_named(&file, "Add")).unwrap();
        let sub = file.get(decl_named(&file, "Sub")).unwrap();
        let doc = map.doc(&file.comments, add).unwrap();
        assert_eq!(doc.text(), "// Add returns a+b.");
        assert!(map.doc(&file.comments, sub).is_none());
    }

    #[test]
    fn test_rekey_moves_all_groups() {
        let file = GoParser::new().parse(SOURCE).unwrap();
        let mut map = CommentMap::new(&file);
        let add = decl_named(&file, "Add");
        let new = DeclId(99);

        map.rekey(add, new);

        assert_eq!(map.owner(GroupId(1)), Some(Owner::Decl(new)));
        assert_eq!(map.owner(GroupId(2)), Some(Owner::Decl(new)));
        let leading: Vec<_> = map.groups(Owner::Decl(new), Placement::Leading).collect();
        assert_eq!(leading, vec![GroupId(1), GroupId(2)]);
        assert_eq!(map.groups(Owner::Decl(add), Placement::Leading).count(), 0);
        assert_eq!(map.len(), file.comments.len());
    }

    #[test]
    fn test_filter_rehomes_orphans() {
        let file = GoParser::new().parse(SOURCE).unwrap();
        let mut map = CommentMap::new(&file);
        map.rekey(decl_named(&file, "Add"), DeclId(99));

        let moved = map.filter(&file);

        assert_eq!(moved, vec![GroupId(1), GroupId(2)]);
        assert_eq!(map.owner(GroupId(1)), Some(Owner::File));
        assert_eq!(map.len(), file.comments.len());
    }
}
