pub mod health;
pub mod normalize;
pub mod outbound;
pub mod router;
pub mod session;
pub mod spam;

pub use normalize::Normalizer;
pub use outbound::{spawn_sender, OutboundQueue};
pub use session::Session;
pub use spam::{SpamFilter, Verdict};
