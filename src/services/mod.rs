pub mod elevation;
pub mod llm;
pub mod places;
pub mod popularity;
pub mod route_engine;
pub mod routing;
