mod planner;
mod search;
