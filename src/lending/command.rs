pub mod borrow_cmd;
pub mod update_borrow_cmd;
pub mod delete_borrow_cmd;
pub mod return_cmd;
pub mod update_return_cmd;
pub mod delete_return_cmd;
pub mod extend_cmd;
pub mod get_ticket_cmd;
pub mod query_tickets_cmd;
pub mod borrowed_stats_cmd;
