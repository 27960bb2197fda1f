pub mod client;
pub mod reconciler;

pub use client::{ServiceNowClient, TicketClient, TicketError};
pub use reconciler::Reconciler;
