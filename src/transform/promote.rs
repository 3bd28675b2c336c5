use super::{Context, Visitor};
use crate::ast::{Decl, DeclKind, Receiver, Signature};
use tracing::{debug, warn};

/// Turns every free function into a method of the implementation type,
/// recording its signature on the way.
///
/// The promoted declaration gets a new identity, and its comments are
/// re-keyed to follow it.
pub struct Promoter {
    receiver: String,
    implementation: String,
}

impl Promoter {
    pub fn new(receiver: impl Into<String>, implementation: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            implementation: implementation.into(),
        }
    }
}

impl Visitor for Promoter {
    fn enter(&mut self, decl: &mut Decl, cx: &mut Context) -> bool {
        let DeclKind::Func(func) = &decl.kind else {
            return false;
        };
        if !func.receiver.is_none() {
            return false;
        }
        if let Some(reason) = func.promotion_blocker() {
            warn!(function = %func.name, reason = reason.as_str(), "left as a free function");
            cx.metadata.skipped.push((func.name.clone(), reason));
            return false;
        }

        let signature = Signature {
            name: func.name.clone(),
            params: func.params.clone(),
            results: func.results.clone(),
            doc: cx.comments.doc(cx.groups, decl).cloned(),
        };

        let mut method = func.clone();
        method.receiver = Receiver::Synthetic {
            name: self.receiver.clone(),
            ty: format!("*{}", self.implementation),
        };

        let old = decl.id;
        decl.id = cx.ids.next();
        decl.kind = DeclKind::Func(method);
        cx.comments.rekey(old, decl.id);

        debug!(function = %signature.name, ?old, new = ?decl.id, "promoted to method");
        cx.metadata.promoted.push(decl.id);
        cx.metadata.signatures.push(signature);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DeclId, Param, Results, SkipReason, SourceFile};
    use crate::comments::{CommentMap, Owner, Placement};
    use crate::parser::{GoParser, Parser};
    use crate::transform::Transformer;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"package calc

// Add returns a+b.
func Add(a, b int) int {
	return a + b
}

func (c *Counter) Inc() { c.n++ }

// Sub returns a-b.
func Sub(a, b int) int {
	return a - b
}

func Map[T any](xs []T) []T { return xs }

func Tick() // implemented in assembly
"#;

    fn promote(source: &str) -> (SourceFile, CommentMap, crate::transform::TransformMetadata) {
        let mut file = GoParser::new().parse(source).unwrap();
        let mut comments = CommentMap::new(&file);
        let mut transformer = Transformer::new().add(Promoter::new("mck", "CalculatorImpl"));
        let metadata = transformer.transform(&mut file, &mut comments).clone();
        (file, comments, metadata)
    }

    #[test]
    fn test_records_signatures_in_source_order() {
        let (_, _, metadata) = promote(SOURCE);
        assert_eq!(metadata.promoted_names(), vec!["Add", "Sub"]);

        let add = &metadata.signatures[0];
        assert_eq!(add.params, vec![Param::new(&["a", "b"], "int")]);
        assert_eq!(add.results, Results::Type("int".into()));
        assert_eq!(add.doc.as_ref().map(|d| d.text()), Some("// Add returns a+b.".to_string()));
    }

    #[test]
    fn test_free_functions_become_methods() {
        let (file, _, metadata) = promote(SOURCE);
        for id in &metadata.promoted {
            let decl = file.get(*id).unwrap();
            let DeclKind::Func(func) = &decl.kind else {
                panic!("promoted declaration is not a function");
            };
            assert_eq!(
                func.receiver,
                Receiver::Synthetic {
                    name: "mck".into(),
                    ty: "*CalculatorImpl".into()
                }
            );
        }
    }

    #[test]
    fn test_methods_are_untouched() {
        let (file, _, metadata) = promote(SOURCE);
        let inc = file
            .decls
            .iter()
            .find(|d| matches!(&d.kind, DeclKind::Func(f) if f.name == "Inc"))
            .unwrap();
        assert!(matches!(&inc.kind, DeclKind::Func(f) if f.receiver == Receiver::Declared("(c *Counter)".into())));
        assert!(!metadata.promoted_names().contains(&"Inc"));
    }

    #[test]
    fn test_generic_and_bodyless_functions_are_skipped() {
        let (_, _, metadata) = promote(SOURCE);
        assert_eq!(
            metadata.skipped,
            vec![
                ("Map".to_string(), SkipReason::Generic),
                ("Tick".to_string(), SkipReason::NoBody)
            ]
        );
    }

    #[test]
    fn test_init_and_blank_functions_are_skipped() {
        let source = r#"package calc

func init() { a() }

func init() { b() }

func _() {}

func a() {}

func b() {}
"#;
        let (file, _, metadata) = promote(source);
        assert_eq!(metadata.promoted_names(), vec!["a", "b"]);
        assert_eq!(
            metadata.skipped,
            vec![
                ("init".to_string(), SkipReason::Init),
                ("init".to_string(), SkipReason::Init),
                ("_".to_string(), SkipReason::Blank)
            ]
        );
        let free_inits = file
            .free_functions()
            .filter(|f| f.name == "init")
            .count();
        assert_eq!(free_inits, 2);
    }

    #[test]
    fn test_doc_comments_follow_the_new_identity() {
        let (file, comments, metadata) = promote(SOURCE);
        for (id, sig) in metadata.promoted.iter().zip(&metadata.signatures) {
            let leading: Vec<_> = comments.groups(Owner::Decl(*id), Placement::Leading).collect();
            assert_eq!(leading.len(), 1, "{} lost its doc comment", sig.name);
            assert_eq!(comments.owner(leading[0]), Some(Owner::Decl(*id)));
        }
        // Nothing is left keyed to a declaration that no longer exists
        for group in &file.comments {
            match comments.owner(group.id) {
                Some(Owner::Decl(id)) => assert!(file.contains(id), "{:?} is orphaned", group.id),
                Some(Owner::File) => {}
                None => panic!("{:?} has no owner", group.id),
            }
        }
        assert!(!file.contains(DeclId(1)));
    }
}
