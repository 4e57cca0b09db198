pub mod card;
pub mod event;
