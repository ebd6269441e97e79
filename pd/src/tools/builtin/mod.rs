//! Built-in inventory tools

mod add_item;
mod delete_all;
mod forecast;
mod get_items;
mod get_preference;
mod low_stock;
mod pending_orders;
mod place_order;
mod set_preference;
mod update_quantity;

pub use add_item::AddInventoryItemTool;
pub use delete_all::DeleteAllInventoryTool;
pub use forecast::GetUsageForecastTool;
pub use get_items::GetInventoryItemsTool;
pub use get_preference::GetPreferenceTool;
pub use low_stock::GetLowStockItemsTool;
pub use pending_orders::GetPendingOrdersTool;
pub use place_order::PlaceOrderTool;
pub use set_preference::SetPreferenceTool;
pub use update_quantity::UpdateItemQuantityTool;
