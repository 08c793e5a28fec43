//! Relational data model of the invitation platform.
//!
//! The model is reference data: a registry from table name to a
//! [`TableDef`] descriptor, the closed enum domains, and typed
//! Row/Insert/Update shapes for every entity (see [`models`]).

pub mod enums;
pub mod models;
mod table;
pub mod tables;
pub mod validation;

pub use enums::{
    DbEnum, DonationMethod, DonationStatus, EnumDomain, EventStatus, GuestStatus, MediaType,
    OrgMemberRole, RsvpStatus, StatusTransition,
};
pub use table::{
    Column, ColumnDefault, ColumnType, OnDelete, Relationship, TableDef, TableKind,
};

use std::collections::VecDeque;

/// A named namespace of tables and enum domains.
///
/// The namespace name is what store clients receive as their explicit
/// schema argument.
#[derive(Debug)]
pub struct DatabaseSchema {
    pub name: &'static str,
    pub tables: &'static [TableDef],
    pub enums: &'static [&'static EnumDomain],
}

pub static PUBLIC_SCHEMA: DatabaseSchema = DatabaseSchema {
    name: "public",
    tables: tables::PUBLIC_TABLES,
    enums: enums::ALL_DOMAINS,
};

/// A relationship together with the table declaring it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclaredRelationship<'a> {
    pub table: &'static str,
    pub relationship: &'a Relationship,
}

impl DatabaseSchema {
    pub fn table(&self, name: &str) -> Option<&'static TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn enum_domain(&self, name: &str) -> Option<&'static EnumDomain> {
        self.enums.iter().copied().find(|d| d.name == name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.iter().map(|t| t.name)
    }

    /// Every foreign key declared in this schema, in declaration order.
    pub fn relationships(&self) -> impl Iterator<Item = DeclaredRelationship<'_>> {
        self.tables.iter().flat_map(|t| {
            t.relationships.iter().map(move |r| DeclaredRelationship {
                table: t.name,
                relationship: r,
            })
        })
    }

    /// Foreign keys pointing at `table`.
    pub fn relationships_to<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = DeclaredRelationship<'a>> + 'a {
        self.relationships()
            .filter(move |d| d.relationship.referenced_relation == table)
    }

    /// Tables whose rows go away, directly or transitively, when a row of
    /// `table` is deleted. Breadth-first, each table listed once.
    pub fn cascade_children(&self, table: &str) -> Vec<&'static str> {
        let mut children = Vec::new();
        let mut queue = VecDeque::from([table.to_string()]);
        while let Some(parent) = queue.pop_front() {
            for declared in self.relationships_to(&parent) {
                if declared.relationship.on_delete != OnDelete::Cascade {
                    continue;
                }
                if declared.table != table && !children.contains(&declared.table) {
                    children.push(declared.table);
                    queue.push_back(declared.table.to_string());
                }
            }
        }
        children
    }

    /// Non-catalog tables in declaration order: the tables whose
    /// reachability is probed one by one.
    pub fn accessibility_roster(&self) -> Vec<&'static TableDef> {
        self.tables.iter().filter(|t| !t.is_catalog()).collect()
    }

    pub fn catalog_tables(&self) -> Vec<&'static TableDef> {
        self.tables.iter().filter(|t| t.is_catalog()).collect()
    }
}
