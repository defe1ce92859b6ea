//! Business logic built on top of the external-collaborator clients.

pub mod chat;
pub mod checkout;
pub mod orders;
pub mod recommendations;

pub use chat::ChatService;
pub use checkout::CheckoutService;
pub use orders::OrderService;
pub use recommendations::RecommendationService;
