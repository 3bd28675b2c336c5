//! Orchestration of a single rewrite.
//!
//! Parse, check for an existing interface, validate, promote, synthesize,
//! print. Every check that can fail runs before the tree is mutated.

use crate::ast::{DeclKind, SourceFile};
use crate::comments::CommentMap;
use crate::error::MockableError;
use crate::generate::{Generator, GoPrinter, Synthesizer};
use crate::naming::Naming;
use crate::parser::{GoParser, Parser};
use crate::transform::{PresenceCheck, Promoter, TransformMetadata, Transformer};
use crate::Options;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

lazy_static! {
    /// An unaliased `"sync"` import, alone or inside an import group
    static ref SYNC_IMPORT: Regex = Regex::new(r#"(?m)^\s*(?:import\s+)?"sync"\s*$"#).unwrap();
}

/// Result of a run that did not fail
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The interface already exists; the file must be left as it is
    AlreadyPresent { interface: String },
    Rewritten(Rewrite),
}

#[derive(Debug, Clone, Serialize)]
pub struct Rewrite {
    pub code: String,
    pub report: Report,
}

/// What a rewrite did, for `--json` and for logging
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub package: String,
    pub interface: String,
    pub implementation: String,
    pub variable: String,
    pub setter: String,
    pub promoted: Vec<PromotedFunction>,
    pub skipped: Vec<SkippedFunction>,
    pub marker_rewritten: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromotedFunction {
    pub name: String,
    /// Method spec as it appears in the interface
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFunction {
    pub name: String,
    pub reason: &'static str,
}

pub struct RewriteDriver {
    naming: Naming,
    synchronized: bool,
    parser: GoParser,
    printer: GoPrinter,
}

impl RewriteDriver {
    pub fn new(options: &Options) -> Result<Self, MockableError> {
        options.validate()?;
        Ok(Self {
            naming: options.naming(),
            synchronized: options.synchronized,
            parser: GoParser::new(),
            printer: GoPrinter::new(),
        })
    }

    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    /// Rewrite `source`, returning the new text or the abort outcome.
    pub fn run(&self, source: &str) -> Result<Outcome, MockableError> {
        let mut file = self.parser.parse(source)?;
        let mut comments = CommentMap::new(&file);
        debug!(
            package = %file.package,
            decls = file.decls.len(),
            comment_groups = comments.len(),
            "parsed"
        );

        let mut presence = Transformer::new().add(PresenceCheck::new(&self.naming.interface));
        if presence.transform(&mut file, &mut comments).already_present {
            info!(interface = %self.naming.interface, "interface already declared, leaving the file alone");
            return Ok(Outcome::AlreadyPresent {
                interface: self.naming.interface.clone(),
            });
        }

        self.validate(&file)?;
        let marker_rewritten = self.rewrite_marker(&mut file);

        let mut promotion =
            Transformer::new().add(Promoter::new(&self.naming.receiver, &self.naming.implementation));
        let metadata = promotion.transform(&mut file, &mut comments).clone();

        let artifacts = Synthesizer::new(&self.naming)
            .synchronized(self.synchronized)
            .synthesize(&metadata.signatures);
        if self.synchronized {
            self.import_sync(&mut file);
        }
        for artifact in artifacts.into_vec() {
            file.push(DeclKind::Artifact(artifact), String::new(), None);
        }

        let moved = comments.filter(&file);
        if !moved.is_empty() {
            debug!(groups = moved.len(), "comment groups handed to the file");
        }

        let code = self.printer.generate(&file, &comments);
        let report = self.report(&file, &metadata, marker_rewritten);
        info!(
            interface = %report.interface,
            promoted = report.promoted.len(),
            skipped = report.skipped.len(),
            "rewrote file"
        );
        Ok(Outcome::Rewritten(Rewrite { code, report }))
    }

    /// Checks that need the parsed file but must pass before anything changes
    fn validate(&self, file: &SourceFile) -> Result<(), MockableError> {
        let declared = file.top_level_names();
        let mut added = self.naming.declared().to_vec();
        if self.synchronized {
            added.extend(self.naming.synchronized());
        }
        for name in added {
            if declared.contains(name) {
                return Err(MockableError::NameCollision { name: name.to_string() });
            }
        }

        let mut promotable = 0;
        for func in file.free_functions() {
            if func.promotion_blocker().is_some() {
                continue;
            }
            if func.bound_names().any(|n| n == self.naming.receiver) {
                return Err(MockableError::ReceiverConflict {
                    function: func.name.clone(),
                    param: self.naming.receiver.clone(),
                });
            }
            promotable += 1;
        }

        if promotable == 0 {
            warn!(interface = %self.naming.interface, "no free function to promote, emitting an empty interface");
        }
        Ok(())
    }

    /// Point the `go:generate` directive at the mock generator. Returns
    /// whether any directive was rewritten.
    fn rewrite_marker(&self, file: &mut SourceFile) -> bool {
        let mut rewritten = false;
        for group in &mut file.comments {
            for comment in &mut group.comments {
                if comment.text == self.naming.marker {
                    comment.text = self.naming.successor_marker.clone();
                    rewritten = true;
                }
            }
        }
        if !rewritten {
            warn!(marker = %self.naming.marker, "no go:generate directive found to rewrite");
        }
        rewritten
    }

    /// Add `import "sync"` after the last import unless the file has it
    fn import_sync(&self, file: &mut SourceFile) {
        let mut anchor = None;
        for (index, decl) in file.decls.iter().enumerate() {
            match decl.kind {
                DeclKind::Import if SYNC_IMPORT.is_match(&decl.text) => return,
                DeclKind::Import | DeclKind::Package(_) => anchor = Some(index),
                _ => {}
            }
        }
        let index = anchor.map_or(0, |i| i + 1);
        file.insert(index, DeclKind::Import, "import \"sync\"");
        debug!("added sync import");
    }

    fn report(&self, file: &SourceFile, metadata: &TransformMetadata, marker_rewritten: bool) -> Report {
        Report {
            package: file.package.clone(),
            interface: self.naming.interface.clone(),
            implementation: self.naming.implementation.clone(),
            variable: self.naming.variable.clone(),
            setter: self.naming.setter.clone(),
            promoted: metadata
                .signatures
                .iter()
                .map(|s| PromotedFunction {
                    name: s.name.clone(),
                    signature: s.method_spec(),
                    doc: s.doc.as_ref().map(|d| d.text()),
                })
                .collect(),
            skipped: metadata
                .skipped
                .iter()
                .map(|(name, reason)| SkippedFunction {
                    name: name.clone(),
                    reason: reason.as_str(),
                })
                .collect(),
            marker_rewritten,
        }
    }
}
