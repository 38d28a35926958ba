//! Hierarchy of design scopes recovered from a trace file.
use std::fmt::{Display, Formatter};

/// A scope in the design hierarchy. The name is the dot-qualified path from the root scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub children: Vec<Module>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Iterate over this module and all its descendants in depth-first pre-order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Depth-first pre-order traversal of a module tree, created by [`Module::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Module>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Module;

    fn next(&mut self) -> Option<Self::Item> {
        let module = self.stack.pop()?;
        self.stack.extend(module.children.iter().rev());

        Some(module)
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn write_indented(module: &Module, depth: usize, f: &mut Formatter<'_>) -> std::fmt::Result {
            writeln!(f, "{:indent$}{}", "", module.name, indent = depth * 2)?;

            for child in &module.children {
                write_indented(child, depth + 1, f)?;
            }

            Ok(())
        }

        write_indented(self, 0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::Module;

    fn tree() -> Module {
        let mut core = Module::new("TOP.core");
        core.children.push(Module::new("TOP.core.alu"));

        let mut top = Module::new("TOP");
        top.children.push(core);
        top.children.push(Module::new("TOP.mem"));
        top
    }

    #[test]
    fn preorder_walk() {
        let top = tree();
        let names: Vec<&str> = top.walk().map(|m| m.name.as_str()).collect();

        assert_eq!(names, vec!["TOP", "TOP.core", "TOP.core.alu", "TOP.mem"]);
    }

    #[test]
    fn indented_display() {
        assert_eq!(tree().to_string(), "TOP\n  TOP.core\n    TOP.core.alu\n  TOP.mem\n");
    }
}
