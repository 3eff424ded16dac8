pub mod delivery;
pub mod logging;
pub mod sessions;
pub mod storage;
