mod booking;
mod invoice;
mod matching;
mod organization;
mod profile;
mod project;
mod role;
mod sso;

pub use booking::*;
pub use invoice::*;
pub use matching::*;
pub use organization::*;
pub use profile::*;
pub use project::*;
pub use role::*;
pub use sso::*;
