pub mod events;
pub mod logs;
pub mod sns;
pub mod factory;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum GatewayPublisherVia {
    Sns,
    Logs,
}
