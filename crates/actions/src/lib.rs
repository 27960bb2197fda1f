pub mod dispatcher;
pub mod error;
pub mod invoice;
pub mod remote;

pub use dispatcher::{ActionDispatcher, HttpActionDispatcher};
pub use error::ActionError;
pub use invoice::InvoiceClient;
pub use remote::{remote_call, RemoteCall, Service};
