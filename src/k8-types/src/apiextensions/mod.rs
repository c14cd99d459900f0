//! Types of the API extension group: custom resource definitions, their validation
//! schemas and the Scale subresource.
mod crd;
mod scale;
mod schema;

pub use self::crd::*;
pub use self::scale::*;
pub use self::schema::*;
