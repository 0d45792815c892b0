pub mod adjust;
pub mod alert;
pub mod daily;
pub mod manual;
pub mod period;
pub mod punch;
pub mod revalidate;
pub mod roster;
