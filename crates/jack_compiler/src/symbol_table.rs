//! Two-level scoped symbol table: class scope (STATIC/FIELD) and subroutine
//! scope (ARG/LOCAL). Per spec §4.2, indices are dense per-kind counters
//! that start at 0 and are strictly monotonic within their scope.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Local,
}

#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub type_name: String,
    pub kind: Kind,
    pub index: u16,
}

/// Holds both scopes for one class compilation. The class scope persists for
/// the whole class; the subroutine scope is cleared by `start_subroutine`.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, SymbolInfo>,
    subroutine_scope: HashMap<String, SymbolInfo>,
    static_count: u16,
    field_count: u16,
    arg_count: u16,
    local_count: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Clear the subroutine scope and reset its ARG/LOCAL counters. STATIC
    /// and FIELD counters are untouched: they persist for the whole class.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arg_count = 0;
        self.local_count = 0;
    }

    /// Define a new identifier in the scope implied by its kind, returning
    /// the index assigned to it.
    pub fn define(&mut self, name: &str, type_name: &str, kind: Kind) -> u16 {
        let index = match kind {
            Kind::Static => {
                let i = self.static_count;
                self.static_count += 1;
                i
            }
            Kind::Field => {
                let i = self.field_count;
                self.field_count += 1;
                i
            }
            Kind::Arg => {
                let i = self.arg_count;
                self.arg_count += 1;
                i
            }
            Kind::Local => {
                let i = self.local_count;
                self.local_count += 1;
                i
            }
        };
        let info = SymbolInfo { type_name: type_name.to_string(), kind, index };
        match kind {
            Kind::Static | Kind::Field => {
                self.class_scope.insert(name.to_string(), info);
            }
            Kind::Arg | Kind::Local => {
                self.subroutine_scope.insert(name.to_string(), info);
            }
        }
        index
    }

    pub fn var_count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.static_count,
            Kind::Field => self.field_count,
            Kind::Arg => self.arg_count,
            Kind::Local => self.local_count,
        }
    }

    /// Look up `name`, checking subroutine scope first, then class scope.
    /// A miss means `name` denotes a class name or an external subroutine.
    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.subroutine_scope.get(name).or_else(|| self.class_scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_and_monotonic_per_kind() {
        let mut table = SymbolTable::new();
        assert_eq!(table.define("a", "int", Kind::Field), 0);
        assert_eq!(table.define("b", "int", Kind::Field), 1);
        assert_eq!(table.define("c", "int", Kind::Static), 0);
        assert_eq!(table.var_count(Kind::Field), 2);
        assert_eq!(table.var_count(Kind::Static), 1);
    }

    #[test]
    fn start_subroutine_resets_arg_and_local_but_not_class_scope() {
        let mut table = SymbolTable::new();
        table.define("f", "int", Kind::Field);
        table.define("a", "int", Kind::Arg);
        table.define("x", "int", Kind::Local);
        table.start_subroutine();
        assert_eq!(table.var_count(Kind::Arg), 0);
        assert_eq!(table.var_count(Kind::Local), 0);
        assert_eq!(table.var_count(Kind::Field), 1);
        assert!(table.lookup("f").is_some());
        assert!(table.lookup("a").is_none());
    }

    #[test]
    fn lookup_prefers_subroutine_scope_over_class_scope() {
        let mut table = SymbolTable::new();
        table.define("x", "int", Kind::Field);
        table.define("x", "char", Kind::Local);
        let info = table.lookup("x").unwrap();
        assert_eq!(info.kind, Kind::Local);
        assert_eq!(info.type_name, "char");
    }

    #[test]
    fn method_this_occupies_arg_index_zero() {
        let mut table = SymbolTable::new();
        table.start_subroutine();
        assert_eq!(table.define("this", "Point", Kind::Arg), 0);
        assert_eq!(table.define("dx", "int", Kind::Arg), 1);
    }
}
