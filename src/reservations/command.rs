pub mod reserve_cmd;
pub mod cancel_reservation_cmd;
pub mod complete_reservation_cmd;
pub mod get_reservation_cmd;
pub mod list_reservations_cmd;
pub mod notify_cmd;
pub mod expire_cmd;
