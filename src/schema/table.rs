//! Declarative table descriptors.
//!
//! A [`TableDef`] is plain reference data: it describes columns, keys and
//! relationships but enforces nothing. Enforcement belongs to the store.

use super::enums::EnumDomain;

#[macro_export]
macro_rules! schema_column {
    ($name:expr, $column_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // mutated only when field overrides are given
            #[allow(unused_mut)]
            let mut column = $crate::schema::Column {
                name: $name,
                column_type: $column_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

/// `id uuid primary key default gen_random_uuid()`
#[macro_export]
macro_rules! id_column {
    () => {
        $crate::schema_column!(
            "id",
            $crate::schema::ColumnType::Uuid,
            is_primary_key = true,
            non_null = true,
            default_value = Some($crate::schema::ColumnDefault::GeneratedUuid)
        )
    };
}

/// `<name> timestamptz not null default now()`
#[macro_export]
macro_rules! timestamp_column {
    ($name:expr) => {
        $crate::schema_column!(
            $name,
            $crate::schema::ColumnType::Timestamptz,
            non_null = true,
            default_value = Some($crate::schema::ColumnDefault::Now)
        )
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Uuid,
    Text,
    Integer,
    /// Arbitrary precision number (money amounts).
    Numeric,
    /// Double precision float (coordinates).
    Double,
    Boolean,
    Timestamptz,
    Json,
    Enum(&'static EnumDomain),
}

impl ColumnType {
    /// Type name as the relational store spells it.
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Uuid => "uuid",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Numeric => "numeric",
            ColumnType::Double => "double precision",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamptz => "timestamptz",
            ColumnType::Json => "jsonb",
            ColumnType::Enum(domain) => domain.name,
        }
    }
}

/// How the store fills a column the caller left out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnDefault {
    GeneratedUuid,
    Now,
    /// A literal SQL expression, e.g. `'free'`, `0` or `'{}'`.
    Literal(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<ColumnDefault>,
}

impl Column {
    /// Whether an Insert must carry this column.
    pub fn is_insert_required(&self) -> bool {
        self.non_null && self.default_value.is_none()
    }

    pub fn enum_domain(&self) -> Option<&'static EnumDomain> {
        match self.column_type {
            ColumnType::Enum(domain) => Some(domain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    NoAction,
    Restrict,
    SetNull,
    Cascade,
}

impl OnDelete {
    pub fn sql(&self) -> &'static str {
        match self {
            OnDelete::NoAction => "NO ACTION",
            OnDelete::Restrict => "RESTRICT",
            OnDelete::SetNull => "SET NULL",
            OnDelete::Cascade => "CASCADE",
        }
    }
}

/// A declared foreign key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relationship {
    pub foreign_key_name: &'static str,
    pub columns: &'static [&'static str],
    pub is_one_to_one: bool,
    pub referenced_relation: &'static str,
    pub referenced_columns: &'static [&'static str],
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Owned by a tenant (user, org or event).
    Tenant,
    /// Shared reference data not owned by any single event.
    Catalog,
}

#[derive(Debug, PartialEq)]
pub struct TableDef {
    pub name: &'static str,
    pub kind: TableKind,
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
    pub unique_constraints: &'static [&'static [&'static str]],
    pub relationships: &'static [Relationship],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_catalog(&self) -> bool {
        self.kind == TableKind::Catalog
    }

    /// A column that always exists, is non-null and indexed, suitable for a
    /// one-row reachability read. This is the leading primary key column,
    /// which is not `id` for composite or parent-keyed tables.
    pub fn probe_column(&self) -> &'static str {
        self.primary_key.first().copied().unwrap_or("id")
    }

    pub fn insert_required_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_insert_required())
    }

    pub fn server_generated_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.default_value.is_some())
    }

    pub fn enum_columns(&self) -> impl Iterator<Item = (&Column, &'static EnumDomain)> {
        self.columns
            .iter()
            .filter_map(|c| c.enum_domain().map(|d| (c, d)))
    }

    /// The relationship this table declares on `column`, if any.
    pub fn relationship_on(&self, column: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|r| r.columns.contains(&column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::enums::RSVP_STATUS;

    const PARENT_FK: Relationship = Relationship {
        foreign_key_name: "child_parent_id_fkey",
        columns: &["parent_id"],
        is_one_to_one: false,
        referenced_relation: "parent",
        referenced_columns: &["id"],
        on_delete: OnDelete::Cascade,
    };

    const CHILD: TableDef = TableDef {
        name: "child",
        kind: TableKind::Tenant,
        columns: &[
            id_column!(),
            schema_column!("parent_id", ColumnType::Uuid, non_null = true),
            schema_column!(
                "status",
                ColumnType::Enum(&RSVP_STATUS),
                non_null = true,
                default_value = Some(ColumnDefault::Literal("'yes'"))
            ),
            schema_column!("note", ColumnType::Text),
            timestamp_column!("created_at"),
        ],
        primary_key: &["id"],
        unique_constraints: &[],
        relationships: &[PARENT_FK],
    };

    const LINK: TableDef = TableDef {
        name: "link",
        kind: TableKind::Tenant,
        columns: &[
            schema_column!("a_id", ColumnType::Uuid, non_null = true),
            schema_column!("b_id", ColumnType::Uuid, non_null = true),
        ],
        primary_key: &["a_id", "b_id"],
        unique_constraints: &[],
        relationships: &[],
    };

    #[test]
    fn test_insert_required_columns_skip_defaults_and_nullables() {
        let required: Vec<&str> = CHILD.insert_required_columns().map(|c| c.name).collect();
        assert_eq!(required, vec!["parent_id"]);

        let generated: Vec<&str> = CHILD.server_generated_columns().map(|c| c.name).collect();
        assert_eq!(generated, vec!["id", "status", "created_at"]);
    }

    #[test]
    fn test_probe_column_follows_primary_key() {
        assert_eq!(CHILD.probe_column(), "id");
        assert_eq!(LINK.probe_column(), "a_id");
    }

    #[test]
    fn test_enum_columns_expose_their_domain() {
        let enums: Vec<(&str, &str)> = CHILD
            .enum_columns()
            .map(|(c, d)| (c.name, d.name))
            .collect();
        assert_eq!(enums, vec![("status", "rsvp_status")]);
        assert_eq!(CHILD.column("status").unwrap().column_type.sql_name(), "rsvp_status");
    }

    #[test]
    fn test_relationship_lookup_by_column() {
        assert_eq!(CHILD.relationship_on("parent_id"), Some(&PARENT_FK));
        assert_eq!(CHILD.relationship_on("note"), None);
    }
}
