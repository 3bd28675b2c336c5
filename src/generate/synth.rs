use crate::ast::{Arg, Artifact, Param, Results, Signature};
use crate::naming::{Naming, SETTER_PARAM};
use std::collections::HashSet;

/// Declarations added to the file, kept apart until they are appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub interface: Artifact,
    pub implementation: Artifact,
    pub variable: Artifact,
    /// Lock and getter, present only when access is synchronized
    pub guard: Option<(Artifact, Artifact)>,
    pub setter: Artifact,
    pub delegates: Vec<Artifact>,
}

impl Artifacts {
    /// Interface, implementation, variable, lock and getter, setter, then the
    /// delegates in discovery order.
    pub fn into_vec(self) -> Vec<Artifact> {
        let mut decls = vec![self.interface, self.implementation, self.variable];
        if let Some((lock, getter)) = self.guard {
            decls.push(lock);
            decls.push(getter);
        }
        decls.push(self.setter);
        decls.extend(self.delegates);
        decls
    }
}

/// Builds the seam around a set of promoted signatures
pub struct Synthesizer<'a> {
    naming: &'a Naming,
    synchronized: bool,
}

impl<'a> Synthesizer<'a> {
    pub fn new(naming: &'a Naming) -> Self {
        Self {
            naming,
            synchronized: false,
        }
    }

    /// Guard the variable with a `sync.RWMutex`: the setter swaps under the
    /// write lock and delegates read through a getter.
    pub fn synchronized(mut self, synchronized: bool) -> Self {
        self.synchronized = synchronized;
        self
    }

    pub fn synthesize(&self, signatures: &[Signature]) -> Artifacts {
        let guard = self.synchronized.then(|| {
            (
                Artifact::Lock {
                    name: self.naming.lock.clone(),
                },
                Artifact::Getter {
                    name: self.naming.getter.clone(),
                    ty: self.naming.interface.clone(),
                    variable: self.naming.variable.clone(),
                    lock: self.naming.lock.clone(),
                },
            )
        });
        Artifacts {
            interface: self.interface(signatures),
            implementation: Artifact::Struct {
                name: self.naming.implementation.clone(),
            },
            variable: Artifact::Variable {
                name: self.naming.variable.clone(),
                ty: self.naming.interface.clone(),
                implementation: self.naming.implementation.clone(),
            },
            setter: Artifact::Setter {
                name: self.naming.setter.clone(),
                param: SETTER_PARAM.to_string(),
                ty: self.naming.interface.clone(),
                variable: self.naming.variable.clone(),
                lock: self.synchronized.then(|| self.naming.lock.clone()),
            },
            guard,
            delegates: signatures.iter().map(|s| self.delegate(s)).collect(),
        }
    }

    fn interface(&self, signatures: &[Signature]) -> Artifact {
        let methods = signatures
            .iter()
            .map(|s| Signature {
                doc: None,
                ..s.clone()
            })
            .collect();
        Artifact::Interface {
            name: self.naming.interface.clone(),
            methods,
        }
    }

    fn delegate(&self, signature: &Signature) -> Artifact {
        let (params, args) = forwardable(&signature.params, &signature.results);
        Artifact::Delegate {
            name: signature.name.clone(),
            params,
            results: signature.results.clone(),
            target: self.target(),
            args,
        }
    }

    fn target(&self) -> String {
        if self.synchronized {
            format!("{}()", self.naming.getter)
        } else {
            self.naming.variable.clone()
        }
    }
}

/// Name every parameter so it can be forwarded. Unnamed and blank parameters
/// get `argN`, where N is the parameter's position.
fn forwardable(params: &[Param], results: &Results) -> (Vec<Param>, Vec<Arg>) {
    let mut taken: HashSet<String> = params.iter().flat_map(|p| p.names.iter().cloned()).collect();
    if let Results::List(list) = results {
        taken.extend(list.iter().flat_map(|p| p.names.iter().cloned()));
    }

    let mut position = 0;
    let mut named = Vec::with_capacity(params.len());
    let mut args = Vec::new();

    for param in params {
        let count = param.names.len().max(1);
        let mut names = Vec::with_capacity(count);
        for i in 0..count {
            let name = match param.names.get(i).map(String::as_str) {
                Some(name) if name != "_" => name.to_string(),
                _ => fresh_name(position, &mut taken),
            };
            args.push(Arg {
                name: name.clone(),
                spread: param.variadic,
            });
            names.push(name);
            position += 1;
        }
        named.push(Param {
            names,
            ty: param.ty.clone(),
            variadic: param.variadic,
        });
    }

    (named, args)
}

fn fresh_name(position: usize, taken: &mut HashSet<String>) -> String {
    let mut name = format!("arg{}", position);
    while taken.contains(&name) {
        name.push('_');
    }
    taken.insert(name.clone());
    name
}
