//! Clients for the external collaborators this service talks to.
//!
//! Each collaborator sits behind a trait so services receive an explicitly
//! constructed client (no module-level singletons) and tests can inject fakes.

pub mod assistant;
pub mod content_store;
pub mod payment_gateway;

pub use assistant::{HttpAssistant, SupportAssistant};
pub use content_store::{ContentStore, HttpContentStore};
pub use payment_gateway::{GatewayOrder, GatewayOrderRequest, HttpPaymentGateway, PaymentGateway};
