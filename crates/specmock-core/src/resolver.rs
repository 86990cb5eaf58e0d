//! Reference resolution over a document's definitions.

use crate::error::{Error, Result};
use crate::schema::{SchemaNode, definition_name};
use std::collections::BTreeMap;

/// Resolves `$ref` tokens against a definition table.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'d> {
    definitions: &'d BTreeMap<String, SchemaNode>,
}

/// A resolved node plus the definition names crossed to reach it.
#[derive(Debug, Clone)]
pub struct Resolved<'d> {
    pub node: &'d SchemaNode,
    pub chain: Vec<String>,
}

impl<'d> Resolver<'d> {
    pub fn new(definitions: &'d BTreeMap<String, SchemaNode>) -> Self {
        Self { definitions }
    }

    /// Look up a definition by name.
    pub fn definition(&self, name: &str) -> Result<&'d SchemaNode> {
        self.definitions
            .get(name)
            .ok_or_else(|| Error::UnresolvedReference(name.to_string()))
    }

    /// Follow references until a non-reference node is reached.
    pub fn resolve<'n>(&self, node: &'n SchemaNode) -> Result<&'n SchemaNode>
    where
        'd: 'n,
    {
        self.resolve_chain(node).map(|resolved| resolved.node)
    }

    /// Like [`Resolver::resolve`], also reporting every definition name
    /// the chain passed through. A name appearing twice is a cycle.
    pub fn resolve_chain<'n>(&self, node: &'n SchemaNode) -> Result<Resolved<'n>>
    where
        'd: 'n,
    {
        let mut current = node;
        let mut chain: Vec<String> = Vec::new();

        while let SchemaNode::Reference(token) = current {
            let name =
                definition_name(token).ok_or_else(|| Error::UnresolvedReference(token.clone()))?;
            if chain.contains(&name) {
                chain.push(name);
                return Err(Error::CircularReference { chain });
            }
            current = self
                .definitions
                .get(&name)
                .ok_or_else(|| Error::UnresolvedReference(token.clone()))?;
            chain.push(name);
        }

        Ok(Resolved {
            node: current,
            chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AnySchema, StringSchema};
    use pretty_assertions::assert_eq;

    fn table(entries: Vec<(&str, SchemaNode)>) -> BTreeMap<String, SchemaNode> {
        entries
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect()
    }

    #[test]
    fn test_non_reference_resolves_to_itself() {
        let defs = table(vec![]);
        let resolver = Resolver::new(&defs);
        let node = SchemaNode::Any(AnySchema::default());
        assert_eq!(resolver.resolve(&node).unwrap(), &node);
    }

    #[test]
    fn test_transitive_resolution() {
        let defs = table(vec![
            ("A", SchemaNode::reference("B")),
            ("B", SchemaNode::Reference("C".to_string())),
            ("C", SchemaNode::String(StringSchema::default())),
        ]);
        let resolver = Resolver::new(&defs);

        let start = SchemaNode::reference("A");
        let resolved = resolver.resolve_chain(&start).unwrap();
        assert_eq!(resolved.node.kind_name(), "string");
        assert_eq!(resolved.chain, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_circular_chain() {
        let defs = table(vec![
            ("A", SchemaNode::reference("B")),
            ("B", SchemaNode::reference("A")),
        ]);
        let resolver = Resolver::new(&defs);

        let err = resolver.resolve(&SchemaNode::reference("A")).unwrap_err();
        match err {
            Error::CircularReference { chain } => assert_eq!(chain, vec!["A", "B", "A"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_reference_chain() {
        let defs = table(vec![("Loop", SchemaNode::reference("Loop"))]);
        let resolver = Resolver::new(&defs);
        assert!(matches!(
            resolver.resolve(&SchemaNode::reference("Loop")),
            Err(Error::CircularReference { .. })
        ));
    }

    #[test]
    fn test_unresolved_reference() {
        let defs = table(vec![]);
        let resolver = Resolver::new(&defs);

        let err = resolver.resolve(&SchemaNode::reference("Missing")).unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference(ref t) if t == "#/definitions/Missing"));

        let err = resolver
            .resolve(&SchemaNode::Reference("#/parameters/x".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference(_)));
    }
}
