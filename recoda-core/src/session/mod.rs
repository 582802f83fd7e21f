pub mod capture;
pub mod countdown;
pub mod events;
pub(crate) mod live;
pub mod meter;
pub mod ticker;
