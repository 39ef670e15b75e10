use serde::{Deserialize, Serialize};
use std::fmt;

/// The catalog source an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    Hdfs,
    Hive,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hdfs => "HDFS",
            Self::Hive => "HIVE",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of entity within its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    File,
    Directory,
    Database,
    Table,
    View,
    Field,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "FILE",
            Self::Directory => "DIRECTORY",
            Self::Database => "DATABASE",
            Self::Table => "TABLE",
            Self::View => "VIEW",
            Self::Field => "FIELD",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The attributes the catalog derives an entity's identity from.
///
/// Views share the table model class; columns are Hive `FIELD`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityDescriptor {
    HdfsFile { path: String },
    HdfsDirectory { path: String },
    HiveDatabase { database: String },
    HiveTable { database: String, table: String },
    HiveView { database: String, view: String },
    HiveColumn { database: String, table: String, column: String },
}

impl EntityDescriptor {
    pub fn hdfs_file(path: impl Into<String>) -> Self {
        Self::HdfsFile { path: path.into() }
    }

    pub fn hdfs_directory(path: impl Into<String>) -> Self {
        Self::HdfsDirectory { path: path.into() }
    }

    pub fn hive_database(database: impl Into<String>) -> Self {
        Self::HiveDatabase {
            database: database.into(),
        }
    }

    pub fn hive_table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::HiveTable {
            database: database.into(),
            table: table.into(),
        }
    }

    pub fn hive_view(database: impl Into<String>, view: impl Into<String>) -> Self {
        Self::HiveView {
            database: database.into(),
            view: view.into(),
        }
    }

    pub fn hive_column(
        database: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self::HiveColumn {
            database: database.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            Self::HdfsFile { .. } | Self::HdfsDirectory { .. } => SourceType::Hdfs,
            _ => SourceType::Hive,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::HdfsFile { .. } => EntityType::File,
            Self::HdfsDirectory { .. } => EntityType::Directory,
            Self::HiveDatabase { .. } => EntityType::Database,
            Self::HiveTable { .. } => EntityType::Table,
            Self::HiveView { .. } => EntityType::View,
            Self::HiveColumn { .. } => EntityType::Field,
        }
    }

    /// Catalog model class the managed properties are mapped onto.
    pub fn model_class(&self) -> &'static str {
        match self {
            Self::HdfsFile { .. } | Self::HdfsDirectory { .. } => "fselement",
            Self::HiveDatabase { .. } => "hv_database",
            Self::HiveTable { .. } | Self::HiveView { .. } => "hv_table",
            Self::HiveColumn { .. } => "hv_column",
        }
    }

    /// Identity attributes in catalog naming, in a stable order.
    pub fn id_attrs(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::HdfsFile { path } | Self::HdfsDirectory { path } => {
                vec![("fileSystemPath", path.as_str())]
            }
            Self::HiveDatabase { database } => vec![("databaseName", database.as_str())],
            Self::HiveTable { database, table }
            | Self::HiveView {
                database,
                view: table,
            } => vec![
                ("databaseName", database.as_str()),
                ("tableName", table.as_str()),
            ],
            Self::HiveColumn {
                database,
                table,
                column,
            } => vec![
                ("databaseName", database.as_str()),
                ("tableName", table.as_str()),
                ("columnName", column.as_str()),
            ],
        }
    }

    /// True when every identity attribute is non-empty.
    pub fn has_id_attrs(&self) -> bool {
        self.id_attrs()
            .iter()
            .all(|(_, value)| !value.trim().is_empty())
    }
}

impl fmt::Display for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HdfsFile { path } | Self::HdfsDirectory { path } => f.write_str(path),
            Self::HiveDatabase { database } => f.write_str(database),
            Self::HiveTable { database, table } => write!(f, "{database}.{table}"),
            Self::HiveView { database, view } => write!(f, "{database}.{view}"),
            Self::HiveColumn {
                database,
                table,
                column,
            } => write!(f, "{database}.{table}.{column}"),
        }
    }
}
