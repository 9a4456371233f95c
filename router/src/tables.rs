//! Tables served by the router

use ledger_tables_core::{ColumnDefinition, ColumnType, TableSchema};

/// Quantity history per item and organization
pub const INVENTORY_HISTORY: &str = "InventoryHistory";

/// Price history per item and organization
pub const PRICE_LIST_HISTORY: &str = "PriceListHistory";

/// Quantity per item, organization, node and date
pub const INVENTORY_LEDGER: &str = "InventoryLedger";

fn history(name: &str, value: &str) -> TableSchema {
    TableSchema::new(
        name,
        vec![
            ColumnDefinition::key("ItemId", ColumnType::String),
            ColumnDefinition::key("OrgCode", ColumnType::String),
            ColumnDefinition::key("CreateTS", ColumnType::String),
            ColumnDefinition::value(value, ColumnType::Int32),
        ],
    )
}

/// `InventoryHistory(ItemId, OrgCode, CreateTS | Qty)`
pub fn inventory_history() -> TableSchema {
    history(INVENTORY_HISTORY, "Qty")
}

/// `PriceListHistory(ItemId, OrgCode, CreateTS | Price)`
pub fn price_list_history() -> TableSchema {
    history(PRICE_LIST_HISTORY, "Price")
}

/// `InventoryLedger(ItemId, OrgCode, Node, Date | Qty)`
pub fn inventory_ledger() -> TableSchema {
    TableSchema::new(
        INVENTORY_LEDGER,
        vec![
            ColumnDefinition::key("ItemId", ColumnType::String),
            ColumnDefinition::key("OrgCode", ColumnType::String),
            ColumnDefinition::key("Node", ColumnType::String),
            ColumnDefinition::key("Date", ColumnType::String),
            ColumnDefinition::value("Qty", ColumnType::Int32),
        ],
    )
}
