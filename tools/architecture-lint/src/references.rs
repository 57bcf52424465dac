//! Collects the modules and crates a source file names.
//!
//! `self` and `super` are resolved against the file's module path, including
//! inline `mod` blocks, so `use super::*` inside `domain::screen::tests` is
//! seen as a reference to `domain`.

use std::collections::BTreeSet;
use std::path::Path;

use syn::visit::{self, Visit};

use crate::zone::{Layer, module_path};

/// Library crate name as seen from the binary and from integration tests.
const CRATE_NAME: &str = "frontend";

/// What a path points at.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Target {
    /// A top-level module of the library.
    Layer(Layer),
    /// The first segment of a path that is not relative to this crate.
    Crate(String),
}

/// A path found in a file, and whether it sits in test-only code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Reference {
    pub(crate) target: Target,
    pub(crate) in_test: bool,
}

/// Every distinct reference in `parsed`.
///
/// `library` says whether `crate::` names the `frontend` library.
pub(crate) fn collect(file: &Path, library: bool, parsed: &syn::File) -> BTreeSet<Reference> {
    let module = module_path(file);
    let companion = module.last().is_some_and(|leaf| leaf == "tests");
    let mut collector = Collector {
        module,
        library,
        test_depth: usize::from(companion),
        references: BTreeSet::new(),
    };
    collector.visit_file(parsed);
    collector.references
}

struct Collector {
    module: Vec<String>,
    library: bool,
    test_depth: usize,
    references: BTreeSet<Reference>,
}

impl Collector {
    fn record(&mut self, segments: &[String], absolute: bool) {
        let Some(target) = self.resolve(segments, absolute) else {
            return;
        };
        self.references.insert(Reference {
            target,
            in_test: self.test_depth > 0,
        });
    }

    fn resolve(&self, segments: &[String], absolute: bool) -> Option<Target> {
        let first = segments.first()?.as_str();
        if absolute {
            return external(segments);
        }
        match first {
            "crate" if self.library => layer_of(segments.get(1)),
            "crate" => None,
            "self" | "super" if self.library => self.resolve_relative(segments),
            "self" | "super" => None,
            _ => external(segments),
        }
    }

    fn resolve_relative(&self, segments: &[String]) -> Option<Target> {
        let ups = segments.iter().take_while(|segment| *segment == "super").count();
        let base = self.module.len().checked_sub(ups)?;
        let rest = segments
            .iter()
            .skip(ups)
            .skip_while(|segment| *segment == "self");
        let mut absolute = self.module.iter().take(base).chain(rest);
        layer_of(absolute.next())
    }

    fn record_use_tree(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>, absolute: bool) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix, absolute);
                prefix.pop();
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                prefix.push(ident.to_string());
                self.record(prefix, absolute);
                prefix.pop();
            }
            syn::UseTree::Glob(_) => self.record(prefix, absolute),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix, absolute);
                }
            }
        }
    }

    fn enter(&mut self, attrs: &[syn::Attribute]) -> bool {
        let gated = attrs.iter().any(marks_test_code);
        if gated {
            self.test_depth += 1;
        }
        gated
    }

    fn leave(&mut self, gated: bool) {
        if gated {
            self.test_depth = self.test_depth.saturating_sub(1);
        }
    }
}

impl<'ast> Visit<'ast> for Collector {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        let gated = self.enter(&node.attrs);
        self.module.push(node.ident.to_string());
        visit::visit_item_mod(self, node);
        self.module.pop();
        self.leave(gated);
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        let gated = self.enter(&node.attrs);
        visit::visit_item_fn(self, node);
        self.leave(gated);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let gated = self.enter(&node.attrs);
        visit::visit_item_impl(self, node);
        self.leave(gated);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        let gated = self.enter(&node.attrs);
        let absolute = node.leading_colon.is_some();
        self.record_use_tree(&node.tree, &mut Vec::new(), absolute);
        self.leave(gated);
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        self.record(&segments, node.leading_colon.is_some());
        visit::visit_path(self, node);
    }
}

fn external(segments: &[String]) -> Option<Target> {
    let first = segments.first()?;
    if first == CRATE_NAME {
        return layer_of(segments.get(1));
    }
    Some(Target::Crate(first.clone()))
}

fn layer_of(segment: Option<&String>) -> Option<Target> {
    segment
        .and_then(|name| Layer::from_module(name))
        .map(Target::Layer)
}

/// `#[cfg(test)]`, `#[test]` and test-runner attributes such as
/// `#[tokio::test]` or `#[rstest]`.
fn marks_test_code(attr: &syn::Attribute) -> bool {
    let path = attr.path();
    if path.is_ident("cfg") {
        return attr
            .parse_args::<syn::Path>()
            .is_ok_and(|predicate| predicate.is_ident("test"));
    }
    path.segments
        .last()
        .is_some_and(|segment| segment.ident == "test" || segment.ident == "rstest")
}
