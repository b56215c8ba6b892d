mod auth;
mod state;

pub use auth::SharedTokenManager;
pub use auth::TokenManager;
pub use state::ScheduleStateManager;
pub use state::StateError;
