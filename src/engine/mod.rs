//! 引擎层：适配接口（EngineAdapter）、资源就绪轮询、内存模拟世界

pub mod adapter;
pub mod sim;
pub mod spawn;

pub use adapter::{EngineAdapter, Seat, VehicleHandle, SEAT_PRIORITY};
pub use sim::{EngineCall, SimulatedEngine};
pub use spawn::{BoundedPoll, DEFAULT_ASSET_POLL_ATTEMPTS};
