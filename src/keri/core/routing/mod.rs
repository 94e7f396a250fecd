pub mod revery;
pub mod route;
pub mod router;

pub use revery::Revery;
pub use route::Route;
pub use router::Router;
