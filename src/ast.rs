use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Position in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    /// Byte offset in source
    pub byte: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

/// Span in source code (a range from start position to end position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Stable identity of a top-level declaration.
///
/// A declaration whose shape changes gets a fresh id; anything keyed by the
/// old id has to be re-keyed explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclId(pub usize);

/// Identity of a top-level comment group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(pub usize);

/// A parsed Go file: top-level declarations plus the comment groups between them
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub package: String,
    pub decls: Vec<Decl>,
    pub comments: Vec<CommentGroup>,
    pub source: Arc<str>,
    pub ids: IdAllocator,
}

impl SourceFile {
    pub fn new(package: impl Into<String>, source: Arc<str>) -> Self {
        Self {
            package: package.into(),
            decls: Vec::new(),
            comments: Vec::new(),
            source,
            ids: IdAllocator::default(),
        }
    }

    /// Append a declaration and return its id
    pub fn push(&mut self, kind: DeclKind, text: impl Into<String>, span: Option<Span>) -> DeclId {
        let id = self.ids.next();
        self.decls.push(Decl {
            id,
            kind,
            text: text.into(),
            span,
        });
        id
    }

    /// Insert a declaration at `index` and return its id
    pub fn insert(&mut self, index: usize, kind: DeclKind, text: impl Into<String>) -> DeclId {
        let id = self.ids.next();
        self.decls.insert(
            index,
            Decl {
                id,
                kind,
                text: text.into(),
                span: None,
            },
        );
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.decls.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: DeclId) -> bool {
        self.get(id).is_some()
    }

    /// Every identifier declared at package scope (types, funcs, vars, consts).
    /// Methods are not included since they live in their receiver's scope.
    pub fn top_level_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for decl in &self.decls {
            match &decl.kind {
                DeclKind::Type(td) => names.extend(td.specs.iter().map(|s| s.name.clone())),
                DeclKind::Value(vd) => names.extend(vd.names.iter().cloned()),
                DeclKind::Func(f) if f.receiver.is_none() => {
                    names.insert(f.name.clone());
                }
                _ => {}
            }
        }
        names
    }

    /// Top-level functions without a receiver
    pub fn free_functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match &d.kind {
            DeclKind::Func(f) if f.receiver.is_none() => Some(f),
            _ => None,
        })
    }
}

/// Hands out declaration ids; never reuses one within a file.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub fn next(&mut self) -> DeclId {
        let id = DeclId(self.next);
        self.next += 1;
        id
    }
}

/// Top-level declaration
#[derive(Debug, Clone)]
pub struct Decl {
    pub id: DeclId,
    pub kind: DeclKind,
    /// Source text of the declaration (empty for generated declarations)
    pub text: String,
    /// Source span, `None` for generated declarations
    pub span: Option<Span>,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    /// `package name`
    Package(String),
    Import,
    Type(TypeDecl),
    /// `var` and `const` declarations
    Value(ValueDecl),
    /// Functions and methods
    Func(FuncDecl),
    /// Declaration synthesized by the rewrite
    Artifact(Artifact),
}

/// `type` declaration, possibly grouped
#[derive(Debug, Clone, Default)]
pub struct TypeDecl {
    pub specs: Vec<TypeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    /// The declared type is an `interface { ... }` literal
    pub is_interface: bool,
    /// `type Name = ...`
    pub is_alias: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ValueDecl {
    pub names: Vec<String>,
}

/// Function or method declaration
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub receiver: Receiver,
    pub type_params: Option<String>,
    pub params: Vec<Param>,
    pub results: Results,
    pub has_body: bool,
}

impl FuncDecl {
    /// Why this free function cannot become an interface method, if it can't
    pub fn promotion_blocker(&self) -> Option<SkipReason> {
        if self.name == "init" {
            Some(SkipReason::Init)
        } else if self.name == "_" {
            Some(SkipReason::Blank)
        } else if self.type_params.is_some() {
            Some(SkipReason::Generic)
        } else if !self.has_body {
            Some(SkipReason::NoBody)
        } else {
            None
        }
    }

    /// Names bound by the parameter and result lists
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        let results: &[Param] = match &self.results {
            Results::List(list) => list,
            _ => &[],
        };
        self.params
            .iter()
            .chain(results.iter())
            .flat_map(|p| p.names.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// Free function
    None,
    /// Receiver written in the source, kept as text: `(c *Client)`
    Declared(String),
    /// Receiver added by the rewrite
    Synthetic { name: String, ty: String },
}

impl Receiver {
    pub fn is_none(&self) -> bool {
        matches!(self, Receiver::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Methods cannot declare type parameters
    Generic,
    /// Declared without a body (assembly or linkname)
    NoBody,
    /// Package initializer, may be declared more than once
    Init,
    /// `func _()`
    Blank,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Generic => "generic functions cannot be interface methods",
            SkipReason::NoBody => "function has no body",
            SkipReason::Init => "init functions run at package start and cannot be called",
            SkipReason::Blank => "blank functions cannot be interface methods",
        }
    }
}

/// One parameter group: `a, b int`, `s ...string` or a bare type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub names: Vec<String>,
    pub ty: String,
    pub variadic: bool,
}

impl Param {
    pub fn new(names: &[&str], ty: impl Into<String>) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            ty: ty.into(),
            variadic: false,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.names.is_empty() {
            write!(f, "{} ", self.names.join(", "))?;
        }
        if self.variadic {
            write!(f, "...")?;
        }
        write!(f, "{}", self.ty)
    }
}

/// Render a parameter list without the parentheses
pub fn format_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Function results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Results {
    None,
    /// Single unparenthesized type: `func f() error`
    Type(String),
    /// Parenthesized list: `func f() (n int, err error)`
    List(Vec<Param>),
}

impl Results {
    pub fn is_empty(&self) -> bool {
        match self {
            Results::None => true,
            Results::Type(_) => false,
            Results::List(list) => list.is_empty(),
        }
    }
}

impl fmt::Display for Results {
    /// Renders with the leading space, ready to follow a parameter list
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Results::None => Ok(()),
            Results::Type(ty) => write!(f, " {}", ty),
            Results::List(list) => write!(f, " ({})", format_params(list)),
        }
    }
}

/// The signature of a promoted free function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Param>,
    pub results: Results,
    pub doc: Option<CommentGroup>,
}

impl Signature {
    /// `Name(params) results`, as written in an interface body
    pub fn method_spec(&self) -> String {
        format!("{}({}){}", self.name, format_params(&self.params), self.results)
    }
}

/// A single `//` or `/* */` comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// Comments on adjacent lines with nothing else between them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    pub id: GroupId,
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn span(&self) -> Span {
        let start = self.comments.first().map(|c| c.span.start).unwrap_or_default();
        let end = self.comments.last().map(|c| c.span.end).unwrap_or_default();
        Span { start, end }
    }

    /// Comment texts joined by newlines, markers included
    pub fn text(&self) -> String {
        self.comments
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Declarations synthesized around the promoted functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// `type Name interface { ... }`
    Interface { name: String, methods: Vec<Signature> },
    /// `type Name struct{}`
    Struct { name: String },
    /// `var name Interface = &Impl{}`
    Variable {
        name: String,
        ty: String,
        implementation: String,
    },
    /// `var name sync.RWMutex`, guarding the variable
    Lock { name: String },
    /// Reads the variable under the lock
    Getter {
        name: String,
        ty: String,
        variable: String,
        lock: String,
    },
    /// Swaps the variable and hands back the previous value
    Setter {
        name: String,
        param: String,
        ty: String,
        variable: String,
        /// Held for the swap when access is synchronized
        lock: Option<String>,
    },
    /// Free function forwarding to the variable's method
    Delegate {
        name: String,
        params: Vec<Param>,
        results: Results,
        /// Expression the call goes through: the variable, or the getter call
        target: String,
        args: Vec<Arg>,
    },
}

impl Artifact {
    pub fn name(&self) -> &str {
        match self {
            Artifact::Interface { name, .. }
            | Artifact::Struct { name }
            | Artifact::Variable { name, .. }
            | Artifact::Lock { name }
            | Artifact::Getter { name, .. }
            | Artifact::Setter { name, .. }
            | Artifact::Delegate { name, .. } => name,
        }
    }
}

/// Argument in a forwarding call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    /// Forwarded as `name...`
    pub spread: bool,
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spread {
            write!(f, "{}...", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
