pub mod buffer;
pub mod policy;
pub mod returns;
pub mod training;

pub use buffer::EpisodeBuffer;
pub use policy::PolicyNetwork;
pub use returns::{MIN_RETURN_STD, discount_rewards, normalize_returns};
pub use training::PolicyGradient;
