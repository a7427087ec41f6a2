pub mod add_item_cmd;
pub mod get_item_cmd;
pub mod item_stats_cmd;
pub mod remove_item_cmd;
pub mod restore_item_cmd;
pub mod update_item_cmd;
pub mod query_items_cmd;
