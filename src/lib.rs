pub mod ast;
pub mod comments;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod generate;
pub mod naming;
pub mod parser;
pub mod transform;

pub use driver::{Outcome, Report, Rewrite, RewriteDriver};
pub use error::{ErrorKind, MockableError, ParseError};
pub use naming::Naming;

/// What to put behind an interface, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Name of the interface to create, as supplied (capitalized on use)
    pub interface: String,
    /// Name of the Go file to rewrite, relative to the package directory
    pub file_name: String,
    /// Guard the swappable variable with a mutex
    pub synchronized: bool,
}

impl Options {
    pub fn new(interface: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            file_name: file_name.into(),
            synchronized: false,
        }
    }

    pub fn synchronized(mut self, synchronized: bool) -> Self {
        self.synchronized = synchronized;
        self
    }

    pub fn validate(&self) -> Result<(), MockableError> {
        if self.interface.is_empty() {
            return Err(MockableError::Configuration("interface name must be specified".into()));
        }
        if !naming::is_identifier(&self.interface) {
            return Err(MockableError::Configuration(format!(
                "`{}` is not a valid Go identifier",
                self.interface
            )));
        }
        if self.file_name.is_empty() {
            return Err(MockableError::Configuration("file name must be specified".into()));
        }
        if !self.file_name.ends_with(".go") {
            return Err(MockableError::Configuration(format!(
                "{} is not a go file",
                self.file_name
            )));
        }
        Ok(())
    }

    pub fn naming(&self) -> Naming {
        Naming::new(&self.interface, &self.file_name)
    }
}

/// Rewrite one Go source file. Shorthand for building a [`RewriteDriver`].
pub fn rewrite(source: &str, options: &Options) -> Result<Outcome, MockableError> {
    RewriteDriver::new(options)?.run(source)
}
