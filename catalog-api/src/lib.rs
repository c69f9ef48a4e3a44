pub mod error;
pub mod model;
pub mod traits;

pub use error::CatalogError;
pub use model::registration::{
    AllocRegistration, CheckState, CheckStatus, ServiceRegistration, ServiceRegistrations,
};
pub use model::task::{ServiceSpec, TaskServices};
pub use traits::client::CatalogServiceClient;

pub mod prelude {
    pub use crate::error::CatalogError;
    pub use crate::model::registration::AllocRegistration;
    pub use crate::model::task::TaskServices;
    pub use crate::traits::client::CatalogServiceClient;
}
