//! Labeled syntax tree.
//!
//! The parser builds nodes bottom-up through [`TreeBuilder`]; the finished
//! [`SyntaxTree`] owns the source text so that terminal nodes can hand out
//! their text as plain slices.

use std::fmt;

use smallvec::SmallVec;

use crate::Span;

/// Index of a node in a [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Every node shape the grammar can produce.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    SourceFile,
    Parameters,
    Parameter,
    ShortDescription,
    StatementBlock,

    // Statements
    Nop,
    Set,
    ExecuteUsing,
    ExecuteSql,
    SiardMetadata,
    SiardOutput,
    ForLoop,
    ForVariables,
    Log,
    Assert,
    Conditional,

    // Expressions
    Connection,
    KeyValuePairs,
    KeyValuePair,
    Query,
    ScriptResult,
    Comparison,
    ComparisonOperator,
    DotExpression,
    VariableInstance,
    Identifier,
    Integer,
    String,
    StringContent,
    EscapeSequence,
    Interpolation,

    // Raw blocks
    Raw,
    RawContent,
    SafeInterpolation,

    // Archive metadata declarations
    SiardSchema,
    SiardType,
    SiardTable,
    SiardColumn,
    SiardField,
    SiardKey,
    SiardCheck,
    SiardView,
    CommandDeclaration,
}

impl NodeKind {
    /// Grammar name of the node kind, as shown in s-expressions and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::SourceFile => "source_file",
            NodeKind::Parameters => "parameters",
            NodeKind::Parameter => "parameter",
            NodeKind::ShortDescription => "short_description",
            NodeKind::StatementBlock => "statement_block",
            NodeKind::Nop => "nop",
            NodeKind::Set => "set",
            NodeKind::ExecuteUsing => "execute_using",
            NodeKind::ExecuteSql => "execute_sql",
            NodeKind::SiardMetadata => "siard_metadata",
            NodeKind::SiardOutput => "siard_output",
            NodeKind::ForLoop => "for_loop",
            NodeKind::ForVariables => "for_variables",
            NodeKind::Log => "log",
            NodeKind::Assert => "assert",
            NodeKind::Conditional => "conditional",
            NodeKind::Connection => "connection",
            NodeKind::KeyValuePairs => "key_value_pairs",
            NodeKind::KeyValuePair => "key_value_pair",
            NodeKind::Query => "query",
            NodeKind::ScriptResult => "script_result",
            NodeKind::Comparison => "comparison",
            NodeKind::ComparisonOperator => "comparison_operator",
            NodeKind::DotExpression => "dot_expression",
            NodeKind::VariableInstance => "variable_instance",
            NodeKind::Identifier => "identifier",
            NodeKind::Integer => "integer",
            NodeKind::String => "string",
            NodeKind::StringContent => "string_content",
            NodeKind::EscapeSequence => "escape_sequence",
            NodeKind::Interpolation => "interpolation",
            NodeKind::Raw => "raw",
            NodeKind::RawContent => "raw_content",
            NodeKind::SafeInterpolation => "safe_interpolation",
            NodeKind::SiardSchema => "siard_schema",
            NodeKind::SiardType => "siard_type",
            NodeKind::SiardTable => "siard_table",
            NodeKind::SiardColumn => "siard_column",
            NodeKind::SiardField => "siard_field",
            NodeKind::SiardKey => "siard_key",
            NodeKind::SiardCheck => "siard_check",
            NodeKind::SiardView => "siard_view",
            NodeKind::CommandDeclaration => "command_declaration",
        }
    }

    /// Terminal kinds whose meaning is their source text.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NodeKind::Identifier
                | NodeKind::Integer
                | NodeKind::StringContent
                | NodeKind::EscapeSequence
                | NodeKind::RawContent
                | NodeKind::ComparisonOperator
                | NodeKind::ShortDescription
                | NodeKind::Nop
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named child slots.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Field {
    Name,
    Value,
    Description,
    Interpreter,
    Script,
    Connection,
    Sql,
    Url,
    Properties,
    Key,
    Variables,
    Rows,
    Body,
    Condition,
    Then,
    Else,
    Left,
    Operator,
    Right,
    File,
    Title,
    Parameters,
    Dbname,
    Archiver,
    ArchiverContact,
    DataOwner,
    DataOriginTimespan,
    LobFolder,
}

impl Field {
    /// Archive information fields of a `SIARD metadata` block, in output order.
    pub const ARCHIVE_INFO: [Field; 7] = [
        Field::Dbname,
        Field::Description,
        Field::Archiver,
        Field::ArchiverContact,
        Field::DataOwner,
        Field::DataOriginTimespan,
        Field::LobFolder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Value => "value",
            Field::Description => "description",
            Field::Interpreter => "interpreter",
            Field::Script => "script",
            Field::Connection => "connection",
            Field::Sql => "sql",
            Field::Url => "url",
            Field::Properties => "properties",
            Field::Key => "key",
            Field::Variables => "variables",
            Field::Rows => "rows",
            Field::Body => "body",
            Field::Condition => "condition",
            Field::Then => "then",
            Field::Else => "else",
            Field::Left => "left",
            Field::Operator => "operator",
            Field::Right => "right",
            Field::File => "file",
            Field::Title => "title",
            Field::Parameters => "parameters",
            Field::Dbname => "dbname",
            Field::Archiver => "archiver",
            Field::ArchiverContact => "archiverContact",
            Field::DataOwner => "dataOwner",
            Field::DataOriginTimespan => "dataOriginTimespan",
            Field::LobFolder => "lobFolder",
        }
    }

    /// Look up an archive information field by its script keyword.
    pub fn archive_info(keyword: &str) -> Option<Field> {
        Field::ARCHIVE_INFO
            .into_iter()
            .find(|field| field.as_str() == keyword)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug)]
struct Child {
    field: Option<Field>,
    id: NodeId,
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    children: SmallVec<[Child; 4]>,
}

/// Bottom-up builder for a [`SyntaxTree`].
#[derive(Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no children.
    pub fn leaf(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.push(kind, span, SmallVec::new())
    }

    /// Add a node whose children were built earlier.
    ///
    /// Children keep the given order; a `Some(field)` label binds the child
    /// to that field as well.
    pub fn node(
        &mut self,
        kind: NodeKind,
        span: Span,
        children: impl IntoIterator<Item = (Option<Field>, NodeId)>,
    ) -> NodeId {
        let children = children
            .into_iter()
            .map(|(field, id)| Child { field, id })
            .collect();
        self.push(kind, span, children)
    }

    fn push(&mut self, kind: NodeKind, span: Span, children: SmallVec<[Child; 4]>) -> NodeId {
        // Trees are bounded by the u32 span space, so ids always fit.
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(NodeData {
            kind,
            span,
            children,
        });
        id
    }

    /// Span of a node that has already been added.
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    /// Finish the tree with `root` as its root node.
    pub fn finish(self, source: impl Into<String>, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            source: source.into(),
            nodes: self.nodes,
            root,
        }
    }
}

/// A parsed script: its source text plus a flat node arena.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> Node<'_> {
        self.node(self.root)
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Borrowed view of one node.
#[derive(Copy, Clone)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    #[inline]
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    /// Source text covered by the node.
    pub fn text(&self) -> &'t str {
        self.span().slice(&self.tree.source)
    }

    /// All children in source order, labeled or not.
    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |child| Node { tree, id: child.id })
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.data().children.get(index).map(|child| Node {
            tree: self.tree,
            id: child.id,
        })
    }

    /// First child bound to `field`.
    pub fn field(&self, field: Field) -> Option<Node<'t>> {
        self.data()
            .children
            .iter()
            .find(|child| child.field == Some(field))
            .map(|child| Node {
                tree: self.tree,
                id: child.id,
            })
    }

    /// Render the subtree as an s-expression, labeling fields.
    ///
    /// Terminals are shown by kind only, matching the usual tree dump format:
    /// `(set name: (identifier) value: (integer))`.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.kind().as_str());
        for child in &self.data().children {
            out.push(' ');
            if let Some(field) = child.field {
                out.push_str(field.as_str());
                out.push_str(": ");
            }
            self.tree.node(child.id).write_sexp(out);
        }
        out.push(')');
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.span())
    }
}

#[cfg(test)]
mod tests;
