//! Static registry of business entities and the tables backing them.
//!
//! Entity-scoped tools never accept raw table names from callers; an input
//! is resolved against this allow-list and rejected if it matches nothing.
//! That keeps identifier interpolation off the table entirely.

/// A known business entity and its backing table.
#[derive(Debug, Clone, Copy)]
pub struct EntityDef {
    /// Canonical entity name.
    pub name: &'static str,
    /// Natural-language aliases accepted by entity-scoped tools.
    pub aliases: &'static [&'static str],
    /// Fully qualified table name.
    pub table: &'static str,
    /// Primary key column.
    pub primary_key: &'static str,
    /// Human-readable description surfaced by `describe_entities`.
    pub description: &'static str,
}

/// All entities the connector knows about.
pub static ENTITIES: &[EntityDef] = &[
    EntityDef {
        name: "customers",
        aliases: &[
            "customer",
            "customers",
            "client",
            "clients",
            "accounts",
            "buyers",
            "companies",
        ],
        table: "daea_Mainframe_VSAM.dbo.CUSTOMERS_VSAM",
        primary_key: "CUSTOMERID",
        description: "VSAM-backed customer master file accessed via CONNX",
    },
    EntityDef {
        name: "orders",
        aliases: &["order", "orders", "purchases", "transactions", "sales"],
        table: "daea_Mainframe_VSAM.dbo.ORDERS_VSAM",
        primary_key: "ORDERID",
        description: "Customer order transactions stored in VSAM",
    },
    EntityDef {
        name: "products",
        aliases: &["product", "products", "items", "inventory", "goods"],
        table: "daea_Mainframe_VSAM.dbo.PRODUCTS_VSAM",
        primary_key: "PRODUCTID",
        description: "Product master file stored in VSAM",
    },
];

/// Resolve a natural-language entity name to its definition.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn resolve_entity(name: &str) -> Option<&'static EntityDef> {
    let n = name.trim().to_lowercase();
    if n.is_empty() {
        return None;
    }
    ENTITIES
        .iter()
        .find(|e| e.name == n || e.aliases.contains(&n.as_str()))
}
