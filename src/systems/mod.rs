mod bookkeeping;
mod demography;
mod immigration;
mod infrastructure;
mod interaction;
mod media;

pub use bookkeeping::BookkeepingSystem;
pub use demography::DemographySystem;
pub use immigration::ImmigrationSystem;
pub use infrastructure::InfrastructureSystem;
pub use interaction::InteractionSystem;
pub use media::MediaSystem;

pub(crate) use immigration::settle_immigrant;
