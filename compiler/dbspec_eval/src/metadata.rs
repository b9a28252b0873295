//! Metadata collected while a script runs.
//!
//! `SIARD metadata for <conn>:` blocks build two trees per connection: the
//! archive description (schemas, tables, columns, ...) handed to the
//! metadata adjuster, and the list of declared commands handed to the
//! report producer. Both are built bottom-up and appended whole.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Node kinds of the archive description tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    Metadata,
    Info,
    Schema,
    Type,
    Table,
    Column,
    Field,
    Key,
    Check,
    View,
}

impl ArchiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveKind::Metadata => "METADATA",
            ArchiveKind::Info => "INFO",
            ArchiveKind::Schema => "SCHEMA",
            ArchiveKind::Type => "TYPE",
            ArchiveKind::Table => "TABLE",
            ArchiveKind::Column => "COLUMN",
            ArchiveKind::Field => "FIELD",
            ArchiveKind::Key => "KEY",
            ArchiveKind::Check => "CHECK",
            ArchiveKind::View => "VIEW",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node kinds of the command tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Command,
    Parameter,
    Sql,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Command => "COMMAND",
            CommandKind::Parameter => "PARAMETER",
            CommandKind::Sql => "SQL",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata node: kind, optional name, payload text and children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MdNode<K> {
    pub kind: K,
    pub name: String,
    pub data: String,
    pub children: Vec<MdNode<K>>,
}

impl<K: Copy + PartialEq> MdNode<K> {
    pub fn new(kind: K, name: impl Into<String>, data: impl Into<String>) -> Self {
        MdNode {
            kind,
            name: name.into(),
            data: data.into(),
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: MdNode<K>) {
        self.children.push(child);
    }

    pub fn children_of(&self, kind: K) -> impl Iterator<Item = &MdNode<K>> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    pub fn child(&self, kind: K, name: &str) -> Option<&MdNode<K>> {
        self.children_of(kind).find(|child| child.name == name)
    }
}

/// `(KIND name "data" children...)`; the name is omitted when empty.
impl<K: fmt::Display> fmt::Display for MdNode<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.kind)?;
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        write!(f, " {:?}", self.data)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}

/// Everything declared for one connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionMetadata {
    pub archive: MdNode<ArchiveKind>,
    pub commands: Vec<MdNode<CommandKind>>,
}

impl Default for ConnectionMetadata {
    fn default() -> Self {
        ConnectionMetadata {
            archive: MdNode::new(ArchiveKind::Metadata, "", ""),
            commands: Vec::new(),
        }
    }
}

/// Metadata of a run, keyed by connection variable name.
#[derive(Debug, Default)]
pub struct MetadataStore {
    connections: FxHashMap<String, ConnectionMetadata>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, connection: &str) -> &mut ConnectionMetadata {
        self.connections.entry(connection.to_owned()).or_default()
    }

    /// Make sure `connection` has an (empty) archive root.
    pub fn touch(&mut self, connection: &str) {
        self.entry(connection);
    }

    /// Append an archive node under the connection's root.
    pub fn declare(&mut self, connection: &str, node: MdNode<ArchiveKind>) {
        self.entry(connection).archive.push(node);
    }

    pub fn declare_command(&mut self, connection: &str, command: MdNode<CommandKind>) {
        self.entry(connection).commands.push(command);
    }

    pub fn archive(&self, connection: &str) -> Option<&MdNode<ArchiveKind>> {
        self.connections.get(connection).map(|md| &md.archive)
    }

    pub fn commands(&self, connection: &str) -> &[MdNode<CommandKind>] {
        self.connections
            .get(connection)
            .map(|md| md.commands.as_slice())
            .unwrap_or_default()
    }
}
