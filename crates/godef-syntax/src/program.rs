// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The per-invocation owner of positions, objects, scopes and methods.

use std::collections::HashMap;

use crate::fileset::FileSet;
use crate::scope::{ObjDecl, ObjId, ObjKind, Object, Scope, ScopeId, ScopeKind};
use crate::token::Pos;
use crate::universe;

/// Everything parsed during one invocation.
///
/// Objects and scopes are stored in arenas and addressed by id, so
/// identifiers, scopes and object declarations can refer to each other
/// freely. The universe scope is created and populated on construction.
#[derive(Debug)]
pub struct Program {
    fileset: FileSet,
    objects: Vec<Object>,
    scopes: Vec<Scope>,
    /// Methods by (package scope, receiver base type name).
    methods: HashMap<(ScopeId, String), Vec<ObjId>>,
    universe: ScopeId,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    pub fn new() -> Self {
        let mut program = Program {
            fileset: FileSet::new(),
            objects: Vec::new(),
            scopes: vec![Scope::new(ScopeKind::Universe, None)],
            methods: HashMap::new(),
            universe: ScopeId(0),
        };
        universe::populate(&mut program);
        program
    }

    pub fn fileset(&self) -> &FileSet {
        &self.fileset
    }

    pub fn fileset_mut(&mut self) -> &mut FileSet {
        &mut self.fileset
    }

    pub fn universe(&self) -> ScopeId {
        self.universe
    }

    // ------------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------------

    pub fn new_scope(&mut self, kind: ScopeKind, outer: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, outer));
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    /// Look `name` up in `scope` and its outer scopes.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<ObjId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(obj) = scope.lookup(name) {
                return Some(obj);
            }
            current = scope.outer;
        }
        None
    }

    /// The predeclared object named `name`.
    pub fn lookup_universe(&self, name: &str) -> Option<ObjId> {
        self.scope(self.universe).lookup(name)
    }

    /// The first file scope on the chain starting at `scope`.
    pub fn enclosing_file_scope(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if scope.kind == ScopeKind::File {
                return Some(id);
            }
            current = scope.outer;
        }
        None
    }

    // ------------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------------

    pub fn new_object(
        &mut self,
        kind: ObjKind,
        name: &str,
        pos: Pos,
        decl: ObjDecl,
        pkg_path: &str,
    ) -> ObjId {
        let id = ObjId(self.objects.len() as u32);
        self.objects.push(Object {
            kind,
            name: name.to_string(),
            pos,
            decl,
            pkg_path: pkg_path.to_string(),
            scope: None,
        });
        id
    }

    pub fn object(&self, id: ObjId) -> &Object {
        &self.objects[id.0 as usize]
    }

    pub fn set_decl(&mut self, id: ObjId, decl: ObjDecl) {
        self.objects[id.0 as usize].decl = decl;
    }

    /// Insert an object into a scope. Returns the object already holding the
    /// name, if any; the new object is then left out of the scope.
    pub fn declare(&mut self, scope: ScopeId, id: ObjId) -> Option<ObjId> {
        let name = self.objects[id.0 as usize].name.clone();
        let existing = self.scope_mut(scope).insert(&name, id);
        if existing.is_none() {
            self.objects[id.0 as usize].scope = Some(scope);
        }
        existing
    }

    // ------------------------------------------------------------------------
    // Methods
    // ------------------------------------------------------------------------

    pub fn add_method(&mut self, package_scope: ScopeId, type_name: &str, id: ObjId) {
        self.methods
            .entry((package_scope, type_name.to_string()))
            .or_default()
            .push(id);
    }

    /// Methods declared on the named type of a package.
    pub fn methods(&self, package_scope: ScopeId, type_name: &str) -> &[ObjId] {
        self.methods
            .get(&(package_scope, type_name.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Move every object and method of `from` into `into`, and re-point
    /// scopes nested in `from` at `into`. Names already present in `into` keep
    /// their object.
    pub fn merge_scope(&mut self, from: ScopeId, into: ScopeId) {
        let ids = self.scope(from).objects().to_vec();
        for id in ids {
            self.declare(into, id);
        }

        let keys: Vec<_> = self
            .methods
            .keys()
            .filter(|(scope, _)| *scope == from)
            .cloned()
            .collect();
        for key in keys {
            if let Some(methods) = self.methods.remove(&key) {
                self.methods
                    .entry((into, key.1))
                    .or_default()
                    .extend(methods);
            }
        }

        for scope in &mut self.scopes {
            if scope.outer == Some(from) {
                scope.outer = Some(into);
            }
        }
    }
}
