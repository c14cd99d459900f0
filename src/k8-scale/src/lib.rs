pub mod jsonpath;
mod projection;
mod registry;
mod rest;
mod typed;
mod unstructured;
mod validation;

pub use self::projection::*;
pub use self::registry::ScaleRegistry;
pub use self::rest::ScaleRest;
pub use self::typed::*;
pub use self::unstructured::*;
pub use self::validation::validate_scale;
