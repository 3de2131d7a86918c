/// Save planning.
pub mod planner;
