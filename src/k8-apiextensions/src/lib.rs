mod conditions;
mod crd_validation;
mod instance;
mod schema_validation;
pub mod dns;

pub use self::conditions::*;
pub use self::crd_validation::*;
pub use self::instance::*;
pub use self::schema_validation::*;
