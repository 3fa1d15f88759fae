mod health;
pub mod router;
pub mod state;

pub use state::ApiState;
